use chrono::{DateTime, Utc};
use explorer_client::WalletSnapshot;
use serde::{Deserialize, Serialize};
use trace_core::{ChainId, Termination, TraceHop, TraceOutcome};
use uuid::Uuid;

/// Standard API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// =====================================
// Trace
// =====================================

#[derive(Debug, Clone, Deserialize)]
pub struct TraceRequest {
    pub address: String,
    pub chain: String,
    /// Falls back to `trace.default_depth`
    #[serde(default)]
    pub depth: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TraceResponse {
    pub status: String,
    pub trace_id: Uuid,
    pub chain: ChainId,
    pub address: String,
    pub termination: Termination,
    pub data: Vec<TraceHop>,
}

impl From<TraceOutcome> for TraceResponse {
    fn from(outcome: TraceOutcome) -> Self {
        Self {
            status: "success".to_string(),
            trace_id: outcome.trace_id,
            chain: outcome.chain,
            address: outcome.start_address,
            termination: outcome.termination,
            data: outcome.hops,
        }
    }
}

// =====================================
// Suspect ledger
// =====================================

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub address: String,
    pub chain: String,
    /// Estimated loss in USD
    #[serde(default)]
    pub impact: Option<f64>,
    /// Link to supporting evidence
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub onchain_verification: WalletSnapshot,
    pub id: i64,
}

// =====================================
// Payment gate
// =====================================

/// Decoded `X-PAYMENT` header
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentProof {
    pub tx_hash: String,
    #[serde(default)]
    pub network: Option<String>,
}

/// Body of a 402 response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChallenge {
    pub x402_version: u32,
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    pub max_amount_required: String,
    pub resource: String,
    pub description: String,
    pub mime_type: String,
    pub pay_to: String,
    pub asset: String,
    pub max_timeout_seconds: u64,
}
