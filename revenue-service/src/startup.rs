//! Application startup and lifecycle management.

use crate::config::RevenueConfig;
use crate::handlers;
use crate::services::{Database, LocalStorage, Notifier, Storage, init_metrics};
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Every collaborator is constructed once here
/// and injected; there are no lazily-built globals.
#[derive(Clone)]
pub struct AppState {
    pub config: RevenueConfig,
    pub db: Database,
    pub storage: Arc<dyn Storage>,
    pub notifier: Notifier,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: RevenueConfig) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            e
        })?;

        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.local_path, &config.storage.public_base_url)
                .await
                .map_err(|e| {
                    tracing::error!(
                        path = %config.storage.local_path,
                        error = %e,
                        "Failed to initialize local storage"
                    );
                    e
                })?,
        );

        let notifier = Notifier::new(db.clone());

        let state = AppState {
            config: config.clone(),
            db,
            storage,
            notifier,
        };

        let app = Router::new()
            .route("/health", get(handlers::health::health_check))
            .route("/ready", get(handlers::health::readiness_check))
            .route("/metrics", get(handlers::health::metrics_handler))
            .route("/signup", post(handlers::profiles::sign_up))
            .route("/setup/admin", post(handlers::profiles::setup_admin))
            .route(
                "/users",
                get(handlers::profiles::list_users).post(handlers::profiles::create_user),
            )
            .route("/taxpayers", get(handlers::profiles::list_taxpayers))
            .route("/profiles/me", get(handlers::profiles::get_me))
            .route("/profiles/avatar", post(handlers::profiles::upload_avatar))
            .route("/profiles/:id", patch(handlers::profiles::update_profile))
            .route(
                "/tax-rates",
                get(handlers::rates::list_rates).put(handlers::rates::update_rates),
            )
            .route(
                "/assessments",
                get(handlers::assessments::list_assessments)
                    .post(handlers::assessments::create_assessment),
            )
            .route("/assessments/:id", get(handlers::assessments::get_assessment))
            .route(
                "/assessments/:id/payments",
                post(handlers::payments::settle_assessment),
            )
            .route("/payments", get(handlers::payments::list_payments))
            .route(
                "/documents",
                get(handlers::documents::list_documents)
                    .post(handlers::documents::upload_document),
            )
            .route(
                "/documents/:id/status",
                patch(handlers::documents::update_document_status),
            )
            .route("/documents/:id/url", get(handlers::documents::get_document_url))
            .route(
                "/tcc-requests",
                get(handlers::tcc::list_tcc_requests).post(handlers::tcc::create_tcc_request),
            )
            .route("/tcc-requests/me", get(handlers::tcc::get_my_tcc_request))
            .route(
                "/tcc-requests/:id/status",
                patch(handlers::tcc::update_tcc_status),
            )
            .route(
                "/notifications",
                get(handlers::notifications::list_notifications),
            )
            .route(
                "/notifications/:id/read",
                post(handlers::notifications::mark_notification_read),
            )
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind TCP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Listening");

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
