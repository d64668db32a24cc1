use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// No usable identity context on a path that requires one.
    Unauthenticated(String),
    /// Identity resolved, but the verdict lacks the required capability.
    Forbidden,
    DocumentNotFound(Uuid),
    /// Rejected before any store mutation, e.g. sharing a document with yourself.
    InvalidOperation(String),
    /// A collaborator failed; not retried here.
    ExternalServiceFailure(String),
    UnexpectedError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(e) => (StatusCode::BAD_REQUEST, format!("Bad request: {}", e)),
            Self::Unauthenticated(e) => (
                StatusCode::UNAUTHORIZED,
                format!("Authentication error: {}", e),
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this operation".to_string(),
            ),
            Self::DocumentNotFound(doc_id) => (
                StatusCode::NOT_FOUND,
                format!("Document {} could not be found", doc_id),
            ),
            Self::InvalidOperation(e) => {
                (StatusCode::BAD_REQUEST, format!("Invalid operation: {}", e))
            }
            Self::ExternalServiceFailure(e) => (
                StatusCode::BAD_GATEWAY,
                format!("Upstream service error: {}", e),
            ),
            Self::UnexpectedError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error has occured".to_string(),
            ),
        }
        .into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        tracing::error!(?error, "database error");
        Self::UnexpectedError
    }
}
