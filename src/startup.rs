use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::{
    configuration::{DatabaseSettings, Settings},
    document::DocumentStore,
    identity::identity_middleware,
    realtime::SessionIssuer,
    routes,
    sharing::SharingStore,
};

pub struct Application {
    listener: TcpListener,
    router: Router,
    port: u16,
}

#[derive(Clone)]
pub struct ApplicationState {
    pub documents: DocumentStore,
    pub sharing: SharingStore,
    pub sessions: SessionIssuer,
    /// Unauthenticated read fallback, applied by the document-read route only.
    pub public_read: bool,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, std::io::Error> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );

        let listener = TcpListener::bind(address).await?;
        let port = listener.local_addr()?.port();
        let connection_pool = get_connection_pool(&settings.database);

        let application_state = ApplicationState {
            documents: DocumentStore::new(connection_pool.clone()),
            sharing: SharingStore::new(connection_pool),
            sessions: SessionIssuer::new(settings.realtime),
            public_read: settings.application.public_read,
        };

        let router = Router::new()
            .route(
                "/documents",
                get(routes::list_documents).post(routes::create_document),
            )
            .route("/documents/titles", post(routes::document_titles))
            .route(
                "/documents/:document_id",
                get(routes::get_document)
                    .patch(routes::update_title)
                    .delete(routes::delete_document),
            )
            .route(
                "/documents/:document_id/shares",
                get(routes::list_shares).put(routes::upsert_share),
            )
            .route(
                "/documents/:document_id/shares/:user_id",
                delete(routes::remove_share),
            )
            .route(
                "/documents/:document_id/sessions",
                post(routes::issue_session),
            )
            .route("/users", get(routes::list_users))
            .route("/me", get(routes::current_user))
            .route_layer(middleware::from_fn_with_state(
                settings.application.signing_key,
                identity_middleware,
            ))
            .route("/health", get(|| async { "ok" }))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::default().include_headers(true)),
            )
            .with_state(application_state);

        Ok(Self {
            listener,
            router,
            port,
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("listening on {}", self.listener.local_addr()?);
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(settings.with_db())
}
