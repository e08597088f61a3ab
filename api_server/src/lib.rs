use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use config_manager::SystemConfig;
use explorer_client::WalletInspector;
use persistence_layer::{PersistenceError, SuspectStore};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use trace_core::{TraceEngine, TraceError};
use tracing::error;

pub mod handlers;
pub mod middleware;
pub mod types;

use handlers::*;
use types::ErrorResponse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SystemConfig>,
    pub engine: Arc<TraceEngine>,
    pub store: Arc<SuspectStore>,
    pub inspector: Arc<WalletInspector>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: SystemConfig,
        engine: TraceEngine,
        store: SuspectStore,
        inspector: WalletInspector,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            store: Arc::new(store),
            inspector: Arc::new(inspector),
            started_at: Instant::now(),
        }
    }
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("{0}")]
    InvalidInput(String),
}

impl From<TraceError> for ApiError {
    fn from(e: TraceError) -> Self {
        match e {
            TraceError::InvalidInput(message) => ApiError::InvalidInput(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let trace_routes = Router::new()
        .route("/api/trace", post(trace_wallet))
        .route_layer(from_fn_with_state(state.clone(), middleware::payment_gate));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/submit", post(submit_report))
        .route("/api/recent", get(recent_reports))
        .merge(trace_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}
