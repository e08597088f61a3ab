use async_trait::async_trait;
use config_manager::ExplorerConfig;
use serde_json::Value;
use trace_core::{
    CanonicalTransaction, ChainId, ProviderFailure, ProviderKind, ProviderResult,
    TransactionProvider,
};
use tracing::{debug, info, warn};

use crate::error::{ExplorerError, Result};
use crate::fetcher::{Auth, HttpFetcher};
use crate::types::{native_amount, BlockscoutTransaction};

const PROVIDER_NAME: &str = "Blockscout";

/// Primary EVM adapter over the Blockscout etherscan-compatible API
#[derive(Debug, Clone)]
pub struct BlockscoutProvider {
    fetcher: HttpFetcher,
    config: ExplorerConfig,
}

impl BlockscoutProvider {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self { fetcher, config })
    }

    fn api_url(&self) -> String {
        format!("{}/api", self.config.api_base_url.trim_end_matches('/'))
    }

    fn auth(&self) -> Result<Auth> {
        Auth::from_config(&self.config, PROVIDER_NAME, |key| Auth::Query {
            name: "apikey",
            value: key,
        })
    }

    /// Incoming, value-carrying transactions of `address`, oldest first
    pub async fn get_incoming_transactions(&self, address: &str) -> Result<Vec<CanonicalTransaction>> {
        let auth = self.auth()?;
        let query = [
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("sort", "asc".to_string()),
            ("page", "1".to_string()),
            ("offset", self.config.page_size.to_string()),
        ];

        let body = self.fetcher.get_json(&self.api_url(), &query, &auth).await?;
        parse_txlist(&body, address)
    }

    /// Native balance in wei
    pub async fn get_balance(&self, address: &str) -> Result<i128> {
        let auth = self.auth()?;
        let query = [
            ("module", "account".to_string()),
            ("action", "balance".to_string()),
            ("address", address.to_string()),
        ];

        let body = self.fetcher.get_json(&self.api_url(), &query, &auth).await?;
        parse_balance(&body)
    }
}

/// Map a `txlist` response to canonical transactions.
///
/// The response is usable when `status` is `"1"` or `result` is a list;
/// only entries sent *to* `address` with a positive value are kept.
pub fn parse_txlist(body: &Value, address: &str) -> Result<Vec<CanonicalTransaction>> {
    let status_ok = body.get("status").and_then(Value::as_str) == Some("1");
    let entries = match body.get("result") {
        Some(Value::Array(entries)) => entries.clone(),
        other => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("missing message");
            return Err(ExplorerError::Shape(format!(
                "txlist result is not a list (status ok: {}, message: {}, result: {})",
                status_ok,
                message,
                other.map(Value::to_string).unwrap_or_default()
            )));
        }
    };

    let entries: Vec<BlockscoutTransaction> = serde_json::from_value(Value::Array(entries))?;
    let total = entries.len();

    let mut transactions = Vec::new();
    for entry in entries {
        let is_to_wallet = entry
            .to
            .as_deref()
            .is_some_and(|to| to.eq_ignore_ascii_case(address));
        if !is_to_wallet {
            continue;
        }

        let value = native_amount(&Value::String(entry.value.clone())).ok_or_else(|| {
            ExplorerError::Shape(format!("Invalid value '{}' in tx {}", entry.value, entry.hash))
        })?;
        if value <= 0 {
            continue;
        }

        transactions.push(CanonicalTransaction::incoming(entry.hash, entry.from, Some(value)));
    }

    debug!("Blockscout: {} of {} transactions are incoming transfers", transactions.len(), total);
    Ok(transactions)
}

fn parse_balance(body: &Value) -> Result<i128> {
    if body.get("status").and_then(Value::as_str) != Some("1") {
        return Err(ExplorerError::Shape(format!(
            "balance lookup returned status {}",
            body.get("status").map(Value::to_string).unwrap_or_default()
        )));
    }

    body.get("result")
        .and_then(native_amount)
        .ok_or_else(|| ExplorerError::Shape("balance result is not a number".to_string()))
}

#[async_trait]
impl TransactionProvider for BlockscoutProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::PrimaryEvm
    }

    async fn fetch(&self, chain: ChainId, address: &str) -> ProviderResult {
        if !chain.is_evm() {
            return ProviderResult::Failure {
                kind: self.kind(),
                reason: ProviderFailure::Unsupported(chain.to_string()),
            };
        }

        match self.get_incoming_transactions(address).await {
            Ok(transactions) => {
                info!("Blockscout: {} incoming transactions for {}", transactions.len(), address);
                ProviderResult::Success {
                    kind: self.kind(),
                    transactions,
                }
            }
            Err(e) => {
                warn!("Blockscout fetch failed for {}: {}", address, e);
                ProviderResult::Failure {
                    kind: self.kind(),
                    reason: e.into(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trace_core::{Counterparty, Direction};

    const WALLET: &str = "0xAbC0000000000000000000000000000000000001";

    #[test]
    fn test_parse_txlist_keeps_incoming_value_transfers() {
        let body = json!({
            "status": "1",
            "message": "OK",
            "result": [
                {
                    "hash": "0xout",
                    "from": WALLET,
                    "to": "0x9999999999999999999999999999999999999999",
                    "value": "1000"
                },
                {
                    "hash": "0xzero",
                    "from": "0x1111111111111111111111111111111111111111",
                    "to": WALLET,
                    "value": "0"
                },
                {
                    "hash": "0xfund",
                    "from": "0x2222222222222222222222222222222222222222",
                    "to": "0xabc0000000000000000000000000000000000001",
                    "value": "60000000000000000000"
                },
                {
                    "hash": "0xcreate",
                    "from": WALLET,
                    "to": "",
                    "value": "0"
                }
            ]
        });

        let transactions = parse_txlist(&body, WALLET).unwrap();

        assert_eq!(transactions.len(), 1);
        let tx = &transactions[0];
        assert_eq!(tx.hash, "0xfund");
        assert_eq!(
            tx.counterparty,
            Counterparty::Known("0x2222222222222222222222222222222222222222".to_string())
        );
        assert_eq!(tx.amount_native, Some(60_000_000_000_000_000_000));
        assert_eq!(tx.direction, Direction::Incoming);
    }

    #[test]
    fn test_parse_txlist_accepts_empty_list_without_status() {
        let body = json!({ "status": "0", "message": "No transactions found", "result": [] });
        assert!(parse_txlist(&body, WALLET).unwrap().is_empty());
    }

    #[test]
    fn test_parse_txlist_rejects_error_string() {
        let body = json!({ "status": "0", "message": "NOTOK", "result": "Max rate limit reached" });
        assert!(matches!(parse_txlist(&body, WALLET), Err(ExplorerError::Shape(_))));
    }

    #[test]
    fn test_parse_txlist_rejects_malformed_entries() {
        let body = json!({ "status": "1", "result": [{ "hash": "0x1" }] });
        assert!(matches!(parse_txlist(&body, WALLET), Err(ExplorerError::Json(_))));

        let body = json!({
            "status": "1",
            "result": [{ "hash": "0x1", "from": "0x2", "to": WALLET, "value": "lots" }]
        });
        assert!(matches!(parse_txlist(&body, WALLET), Err(ExplorerError::Shape(_))));
    }

    #[test]
    fn test_parse_balance() {
        let body = json!({ "status": "1", "message": "OK", "result": "1500000000000000000" });
        assert_eq!(parse_balance(&body).unwrap(), 1_500_000_000_000_000_000);

        let body = json!({ "status": "0", "message": "Invalid address", "result": null });
        assert!(parse_balance(&body).is_err());
    }
}
