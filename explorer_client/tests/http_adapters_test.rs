//! Adapters end-to-end against a local axum server standing in for the explorers

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use config_manager::ExplorerConfig;
use explorer_client::{BlockchairProvider, BlockscoutProvider, SolscanProvider};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trace_core::{
    ChainId, Counterparty, FailoverPolicy, HopAmount, NoPacing, ProviderFailure, ProviderResult,
    ProviderSelector, Termination, TraceEngine, TraceSettings, TransactionProvider,
    BACKUP_SENDER_SENTINEL,
};

const WALLET: &str = "0xabc0000000000000000000000000000000000001";
const FUNDER: &str = "0xf00d000000000000000000000000000000000002";
const SOL_WALLET: &str = "SoLWaLLet1111111111111111111111111111111111";

/// Every request the fake explorer saw: path plus query parameters
#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

impl Recorder {
    fn record(&self, path: &str, query: &HashMap<String, String>) {
        self.requests.lock().unwrap().push((path.to_string(), query.clone()));
    }

    fn requests(&self) -> Vec<(String, HashMap<String, String>)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn blockscout_api(
    State(recorder): State<Recorder>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorder.record("/api", &query);

    let address = query.get("address").cloned().unwrap_or_default();
    match query.get("action").map(String::as_str) {
        Some("balance") => Json(json!({ "status": "1", "message": "OK", "result": "12500000000000000000" })),
        _ if address == WALLET => Json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "hash": "0xfund",
                "from": FUNDER,
                "to": WALLET,
                "value": "60000000000000000000"
            }]
        })),
        _ => Json(json!({ "status": "0", "message": "No transactions found", "result": [] })),
    }
}

async fn solscan_transactions(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    recorder.record("/account/transactions", &query);

    if headers.get("token").and_then(|v| v.to_str().ok()) != Some("sol-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
    }

    (
        StatusCode::OK,
        Json(json!([{
            "txHash": "sig1",
            "fee": 5000,
            "lamport": 0,
            "signer": ["FeePayer1", "Other"]
        }])),
    )
}

async fn blockchair_dashboard(
    State(recorder): State<Recorder>,
    Path((slug, address)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorder.record(&format!("/{}/dashboards/address/{}", slug, address), &query);

    Json(json!({
        "data": {
            address.to_lowercase(): {
                "address": { "balance": "5000000000000000000", "transaction_count": 2 },
                "transactions": [
                    { "hash": "0xbackup", "balance_change": 5000000000000000000u64 }
                ]
            }
        }
    }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!([]))
}

async fn spawn_explorer() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/api", get(blockscout_api))
        .route("/account/transactions", get(solscan_transactions))
        .route("/slow/account/transactions", get(slow))
        .route("/:slug/dashboards/address/:address", get(blockchair_dashboard))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorder)
}

fn explorer(base: &str, api_key: Option<&str>, require_api_key: bool) -> ExplorerConfig {
    ExplorerConfig {
        api_base_url: base.to_string(),
        api_key: api_key.map(str::to_string),
        require_api_key,
        request_timeout_seconds: 1,
        page_size: 25,
    }
}

#[tokio::test]
async fn test_blockscout_sends_query_key_and_filters_incoming() {
    let (base, recorder) = spawn_explorer().await;
    let provider = BlockscoutProvider::new(explorer(&base, Some("bs-key"), false)).unwrap();

    let result = provider.fetch(ChainId::Base, WALLET).await;

    match result {
        ProviderResult::Success { transactions, .. } => {
            assert_eq!(transactions.len(), 1);
            assert_eq!(transactions[0].counterparty, Counterparty::Known(FUNDER.to_string()));
        }
        other => panic!("expected success, got {:?}", other),
    }

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    let query = &requests[0].1;
    assert_eq!(query.get("apikey").map(String::as_str), Some("bs-key"));
    assert_eq!(query.get("action").map(String::as_str), Some("txlist"));
    assert_eq!(query.get("sort").map(String::as_str), Some("asc"));
    assert_eq!(query.get("offset").map(String::as_str), Some("25"));
}

#[tokio::test]
async fn test_solscan_sends_token_header() {
    let (base, _recorder) = spawn_explorer().await;
    let provider = SolscanProvider::new(explorer(&base, Some("sol-key"), true)).unwrap();

    let result = provider.fetch(ChainId::Solana, SOL_WALLET).await;

    match result {
        ProviderResult::Success { transactions, .. } => {
            assert_eq!(transactions.len(), 1);
            assert_eq!(transactions[0].counterparty, Counterparty::Known("FeePayer1".to_string()));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_2xx_becomes_status_failure() {
    let (base, _recorder) = spawn_explorer().await;
    let provider = SolscanProvider::new(explorer(&base, Some("wrong-key"), true)).unwrap();

    let result = provider.fetch(ChainId::Solana, SOL_WALLET).await;

    assert!(matches!(
        result,
        ProviderResult::Failure {
            reason: ProviderFailure::Status { status: 401, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_missing_required_key_sends_nothing() {
    let (base, recorder) = spawn_explorer().await;
    let provider = SolscanProvider::new(explorer(&base, None, true)).unwrap();

    let result = provider.fetch(ChainId::Solana, SOL_WALLET).await;

    assert!(matches!(
        result,
        ProviderResult::Failure {
            reason: ProviderFailure::MissingCredential { .. },
            ..
        }
    ));
    assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn test_slow_explorer_times_out() {
    let (base, _recorder) = spawn_explorer().await;
    let provider = SolscanProvider::new(explorer(&format!("{}/slow", base), Some("sol-key"), true)).unwrap();

    let result = provider.fetch(ChainId::Solana, SOL_WALLET).await;

    assert!(matches!(
        result,
        ProviderResult::Failure {
            reason: ProviderFailure::Timeout(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_wrong_chain_is_unsupported() {
    let (base, recorder) = spawn_explorer().await;
    let provider = BlockscoutProvider::new(explorer(&base, None, false)).unwrap();

    let result = provider.fetch(ChainId::Solana, SOL_WALLET).await;

    assert!(matches!(
        result,
        ProviderResult::Failure {
            reason: ProviderFailure::Unsupported(_),
            ..
        }
    ));
    assert!(recorder.requests().is_empty());
}

fn engine(base: &str) -> TraceEngine {
    let blockscout = BlockscoutProvider::new(explorer(base, None, false)).unwrap();
    let blockchair = BlockchairProvider::new(explorer(base, Some("bc-key"), true)).unwrap();
    let selector = ProviderSelector::new(FailoverPolicy::default())
        .with_primary(ChainId::Base, Arc::new(blockscout))
        .with_backup(Arc::new(blockchair));

    TraceEngine::new(selector, Arc::new(NoPacing), TraceSettings::default())
}

#[tokio::test]
async fn test_trace_stops_at_whale_funder() {
    let (base, _recorder) = spawn_explorer().await;

    let outcome = engine(&base).trace(WALLET, ChainId::Base, 3).await.unwrap();

    assert_eq!(outcome.hops.len(), 2);
    assert_eq!(outcome.hops[0].funded_by, FUNDER);
    assert_eq!(outcome.hops[0].amount, Some(HopAmount::Known(dec!(60))));
    assert!(outcome.hops[1].is_marker());
    assert_eq!(outcome.termination, Termination::WhaleDetected);
}

#[tokio::test]
async fn test_empty_primary_falls_back_to_blockchair() {
    let (base, recorder) = spawn_explorer().await;
    let quiet_wallet = "0xAAA0000000000000000000000000000000000003";

    let outcome = engine(&base).trace(quiet_wallet, ChainId::Base, 5).await.unwrap();

    assert_eq!(outcome.hops.len(), 2);
    assert_eq!(outcome.hops[0].funded_by, BACKUP_SENDER_SENTINEL);
    assert_eq!(outcome.hops[0].amount, Some(HopAmount::Known(dec!(5))));
    assert!(outcome.hops[1].is_marker());
    assert_eq!(outcome.termination, Termination::BackupReached);

    let requests = recorder.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].0, format!("/base/dashboards/address/{}", quiet_wallet));
    assert_eq!(requests[1].1.get("key").map(String::as_str), Some("bc-key"));
    assert_eq!(requests[1].1.get("transaction_details").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn test_wallet_snapshot_reads_balances() {
    let (base, _recorder) = spawn_explorer().await;
    let mut config = config_manager::SystemConfig::default();
    config.blockscout = explorer(&base, None, false);
    config.solscan = explorer(&base, None, true);
    config.blockchair = explorer(&base, Some("bc-key"), true);
    let inspector = explorer_client::ExplorerClients::from_config(&config)
        .unwrap()
        .wallet_inspector();

    let base_snapshot = inspector.snapshot("base", WALLET).await;
    assert_eq!(base_snapshot.balance, dec!(12.5));
    assert_eq!(base_snapshot.provider, "Blockscout Base");

    let eth_snapshot = inspector.snapshot("eth", WALLET).await;
    assert_eq!(eth_snapshot.balance, dec!(5));
    assert_eq!(eth_snapshot.tx_count, 2);

    // Solscan has no key configured
    let sol_snapshot = inspector.snapshot("sol", SOL_WALLET).await;
    assert_eq!(sol_snapshot.provider, "unknown");

    let unsupported = inspector.snapshot("dogecoin", WALLET).await;
    assert_eq!(unsupported.provider, "unknown");
}
