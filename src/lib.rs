pub mod access;
pub mod configuration;
pub mod document;
pub mod error;
pub mod identity;
pub mod realtime;
pub mod routes;
pub mod sharing;
pub mod startup;
pub mod telemetry;
