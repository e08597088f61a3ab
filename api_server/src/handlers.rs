use crate::types::*;
use crate::{ApiError, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use persistence_layer::{risk_tier, NewSuspect, SuspectRecord};
use trace_core::ChainId;
use tracing::info;

/// Number of reports listed by `/api/recent`
const RECENT_LIMIT: u32 = 10;

const INDEX_HTML: &str = include_str!("../templates/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Walk the funding trail of a wallet
pub async fn trace_wallet(
    State(state): State<AppState>,
    Json(request): Json<TraceRequest>,
) -> Result<Json<TraceResponse>, ApiError> {
    let chain: ChainId = request.chain.parse()?;
    let depth = request.depth.unwrap_or(state.config.trace.default_depth);

    let deadline = state
        .config
        .trace
        .deadline()
        .map(|budget| tokio::time::Instant::now() + budget);

    info!("Trace requested for {} on {} (depth {})", request.address, chain, depth);
    let outcome = state
        .engine
        .trace_until(&request.address, chain, depth, deadline)
        .await?;

    info!(
        "Trace {} finished with {} hops ({:?})",
        outcome.trace_id,
        outcome.hops.len(),
        outcome.termination
    );
    Ok(Json(TraceResponse::from(outcome)))
}

/// Record a suspect wallet after a best-effort on-chain check
pub async fn submit_report(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let address = request.address.trim();
    if address.is_empty() {
        return Err(ApiError::InvalidInput("Address must not be empty".to_string()));
    }
    let chain = config_manager::normalize_chain(&request.chain)
        .unwrap_or_else(|_| request.chain.trim().to_lowercase());

    let snapshot = state.inspector.snapshot(&chain, address).await;
    let tier = risk_tier(snapshot.balance);

    let suspect = NewSuspect::new(address, chain.as_str(), tier)
        .with_impact(request.impact.unwrap_or(0.0))
        .with_evidence(request.evidence.clone());
    let id = state.store.insert(&suspect).await?;

    info!("Suspect report #{} stored for {} on {} (tier {})", id, address, chain, tier);
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Report received & verified".to_string(),
            onchain_verification: snapshot,
            id,
        }),
    ))
}

/// Most recent suspect reports
pub async fn recent_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<SuspectRecord>>, ApiError> {
    let suspects = state.store.recent(RECENT_LIMIT).await?;
    Ok(Json(suspects.iter().map(|s| s.to_record()).collect()))
}
