//! Mock x402 payment gate in front of `/api/trace`.
//!
//! A request must carry an `X-PAYMENT` header holding base64-encoded JSON
//! with a non-empty `tx_hash`. Nothing is settled or checked on-chain.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use config_manager::PaymentConfig;
use tracing::{debug, warn};

use crate::types::{ErrorResponse, PaymentChallenge, PaymentProof, PaymentRequirements};
use crate::AppState;

pub const PAYMENT_HEADER: &str = "X-PAYMENT";

pub async fn payment_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let payment = &state.config.payment;
    if !payment.enabled {
        return next.run(request).await;
    }

    let resource = request.uri().path().to_string();
    match check_payment(request.headers()) {
        PaymentCheck::Missing => {
            debug!("No payment header on {}, sending challenge", resource);
            (StatusCode::PAYMENT_REQUIRED, Json(challenge(payment, &resource))).into_response()
        }
        PaymentCheck::Invalid(reason) => {
            warn!("Rejected payment header on {}: {}", resource, reason);
            let body = ErrorResponse {
                error: format!("Invalid payment: {}", reason),
                timestamp: chrono::Utc::now(),
            };
            (StatusCode::FORBIDDEN, Json(body)).into_response()
        }
        PaymentCheck::Accepted(proof) => {
            debug!("Accepted payment proof {} for {}", proof.tx_hash, resource);
            next.run(request).await
        }
    }
}

#[derive(Debug)]
enum PaymentCheck {
    Missing,
    Invalid(String),
    Accepted(PaymentProof),
}

fn check_payment(headers: &HeaderMap) -> PaymentCheck {
    let Some(value) = headers.get(PAYMENT_HEADER) else {
        return PaymentCheck::Missing;
    };

    let encoded = match value.to_str() {
        Ok(encoded) => encoded.trim(),
        Err(_) => return PaymentCheck::Invalid("header is not ASCII".to_string()),
    };
    let decoded = match STANDARD.decode(encoded) {
        Ok(decoded) => decoded,
        Err(e) => return PaymentCheck::Invalid(format!("not base64: {}", e)),
    };
    let proof: PaymentProof = match serde_json::from_slice(&decoded) {
        Ok(proof) => proof,
        Err(e) => return PaymentCheck::Invalid(format!("not a payment payload: {}", e)),
    };

    if proof.tx_hash.trim().is_empty() {
        return PaymentCheck::Invalid("tx_hash is empty".to_string());
    }
    PaymentCheck::Accepted(proof)
}

fn challenge(payment: &PaymentConfig, resource: &str) -> PaymentChallenge {
    PaymentChallenge {
        x402_version: 1,
        error: format!("{} header is required", PAYMENT_HEADER),
        accepts: vec![PaymentRequirements {
            scheme: "exact".to_string(),
            network: payment.network.clone(),
            max_amount_required: payment.max_amount_required.clone(),
            resource: resource.to_string(),
            description: payment.description.clone(),
            mime_type: "application/json".to_string(),
            pay_to: payment.pay_to.clone(),
            asset: payment.asset.clone(),
            max_timeout_seconds: 60,
        }],
    }
}
