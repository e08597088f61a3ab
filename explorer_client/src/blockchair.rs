use async_trait::async_trait;
use config_manager::ExplorerConfig;
use serde_json::{Map, Value};
use trace_core::{
    CanonicalTransaction, ChainId, Counterparty, Direction, ProviderKind, ProviderResult,
    TransactionProvider,
};
use tracing::{debug, info, warn};

use crate::error::{ExplorerError, Result};
use crate::fetcher::{Auth, HttpFetcher};
use crate::types::{native_amount, BlockchairTransaction};

const PROVIDER_NAME: &str = "Blockchair";

/// Blockchair path segment for a traced chain
pub fn chain_slug(chain: ChainId) -> &'static str {
    match chain {
        ChainId::Base => "base",
        ChainId::Solana => "solana",
    }
}

/// Balance and activity read from an address dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSummary {
    /// Smallest native unit
    pub balance: i128,
    pub transaction_count: u64,
}

/// Backup adapter over Blockchair address dashboards.
///
/// Blockchair reports per-transaction balance changes but not the sender,
/// so every transaction it yields has an unknown counterparty.
#[derive(Debug, Clone)]
pub struct BlockchairProvider {
    fetcher: HttpFetcher,
    config: ExplorerConfig,
}

impl BlockchairProvider {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self { fetcher, config })
    }

    /// Fetch the raw dashboard of `address` on the chain named by `slug`
    pub async fn get_dashboard(&self, slug: &str, address: &str) -> Result<Value> {
        let auth = Auth::from_config(&self.config, PROVIDER_NAME, |key| Auth::Query {
            name: "key",
            value: key,
        })?;
        let url = format!(
            "{}/{}/dashboards/address/{}",
            self.config.api_base_url.trim_end_matches('/'),
            slug,
            address
        );
        let query = [("transaction_details", "true".to_string())];

        self.fetcher.get_json(&url, &query, &auth).await
    }

    pub async fn get_incoming_transactions(&self, slug: &str, address: &str) -> Result<Vec<CanonicalTransaction>> {
        let body = self.get_dashboard(slug, address).await?;
        parse_dashboard(&body, address)
    }

    pub async fn get_address_summary(&self, slug: &str, address: &str) -> Result<AddressSummary> {
        let body = self.get_dashboard(slug, address).await?;
        parse_address_summary(&body, address)
    }
}

/// Locate `data.<address>`, trying the exact key first and then a
/// case-insensitive match (EVM dashboards are keyed by the lowercased address).
fn address_entry<'a>(body: &'a Value, address: &str) -> Result<&'a Map<String, Value>> {
    let data = body
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| ExplorerError::Shape("dashboard has no data object".to_string()))?;

    data.get(address)
        .or_else(|| {
            data.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(address))
                .map(|(_, entry)| entry)
        })
        .and_then(Value::as_object)
        .ok_or_else(|| ExplorerError::Shape(format!("dashboard has no entry for {}", address)))
}

/// Map a dashboard response to canonical transactions with positive balance changes
pub fn parse_dashboard(body: &Value, address: &str) -> Result<Vec<CanonicalTransaction>> {
    let entry = address_entry(body, address)?;
    let entries = match entry.get("transactions") {
        Some(Value::Array(entries)) => entries,
        _ => {
            return Err(ExplorerError::Shape(
                "dashboard transactions is not a list".to_string(),
            ))
        }
    };

    let mut transactions = Vec::new();
    // Without transaction_details the list holds bare hashes
    for entry in entries.iter().filter(|entry| entry.is_object()) {
        let tx: BlockchairTransaction = serde_json::from_value(entry.clone())
            .map_err(|e| ExplorerError::Shape(format!("Invalid dashboard transaction: {}", e)))?;
        if tx.hash.trim().is_empty() {
            return Err(ExplorerError::Shape("dashboard transaction has an empty hash".to_string()));
        }

        let change = native_amount(&tx.balance_change).ok_or_else(|| {
            ExplorerError::Shape(format!(
                "Invalid balance_change {} in tx {}",
                tx.balance_change, tx.hash
            ))
        })?;
        if change <= 0 {
            continue;
        }

        transactions.push(CanonicalTransaction {
            hash: tx.hash,
            counterparty: Counterparty::Unknown,
            amount_native: Some(change),
            direction: Direction::Incoming,
        });
    }

    debug!("Blockchair: {} of {} entries are positive balance changes", transactions.len(), entries.len());
    Ok(transactions)
}

pub fn parse_address_summary(body: &Value, address: &str) -> Result<AddressSummary> {
    let entry = address_entry(body, address)?;
    let details = entry
        .get("address")
        .ok_or_else(|| ExplorerError::Shape("dashboard has no address details".to_string()))?;

    let balance = details
        .get("balance")
        .and_then(native_amount)
        .ok_or_else(|| ExplorerError::Shape("address balance is not a number".to_string()))?;
    let transaction_count = details
        .get("transaction_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(AddressSummary {
        balance,
        transaction_count,
    })
}

#[async_trait]
impl TransactionProvider for BlockchairProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Backup
    }

    async fn fetch(&self, chain: ChainId, address: &str) -> ProviderResult {
        match self.get_incoming_transactions(chain_slug(chain), address).await {
            Ok(transactions) => {
                info!("Blockchair: {} positive balance changes for {}", transactions.len(), address);
                ProviderResult::Success {
                    kind: self.kind(),
                    transactions,
                }
            }
            Err(e) => {
                warn!("Blockchair fetch failed for {}: {}", address, e);
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

    const DASHBOARD: &str = r#"{
        "data": {
            "0xabc0000000000000000000000000000000000001": {
                "address": {
                    "type": "account",
                    "balance": "5000000000000000000",
                    "transaction_count": 3
                },
                "transactions": [
                    { "hash": "0xin", "balance_change": 5000000000000000000, "time": "2024-01-01 00:00:00" },
                    { "hash": "0xout", "balance_change": -1000, "time": "2024-01-02 00:00:00" },
                    { "hash": "0xzero", "balance_change": 0 }
                ]
            }
        },
        "context": { "code": 200 }
    }"#;

    #[test]
    fn test_parse_dashboard_matches_address_case_insensitively() {
        let body: Value = serde_json::from_str(DASHBOARD).unwrap();

        let transactions =
            parse_dashboard(&body, "0xAbC0000000000000000000000000000000000001").unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].hash, "0xin");
        assert_eq!(transactions[0].counterparty, Counterparty::Unknown);
        assert_eq!(transactions[0].amount_native, Some(5_000_000_000_000_000_000));
    }

    #[test]
    fn test_parse_dashboard_skips_bare_hashes() {
        let body: Value = serde_json::from_str(
            r#"{ "data": { "addr": { "transactions": ["0x1", "0x2"] } } }"#,
        )
        .unwrap();

        assert!(parse_dashboard(&body, "addr").unwrap().is_empty());
    }

    #[test]
    fn test_parse_dashboard_shape_errors() {
        let no_data: Value = serde_json::from_str(r#"{ "data": null }"#).unwrap();
        assert!(matches!(parse_dashboard(&no_data, "addr"), Err(ExplorerError::Shape(_))));

        let other_address: Value =
            serde_json::from_str(r#"{ "data": { "other": { "transactions": [] } } }"#).unwrap();
        assert!(matches!(parse_dashboard(&other_address, "addr"), Err(ExplorerError::Shape(_))));

        let not_a_list: Value =
            serde_json::from_str(r#"{ "data": { "addr": { "transactions": {} } } }"#).unwrap();
        assert!(matches!(parse_dashboard(&not_a_list, "addr"), Err(ExplorerError::Shape(_))));
    }

    #[test]
    fn test_parse_dashboard_rejects_incomplete_entries() {
        let missing_hash: Value = serde_json::from_str(
            r#"{ "data": { "addr": { "transactions": [{ "balance_change": 5000000000000000000 }] } } }"#,
        )
        .unwrap();
        assert!(matches!(parse_dashboard(&missing_hash, "addr"), Err(ExplorerError::Shape(_))));

        let numeric_hash: Value = serde_json::from_str(
            r#"{ "data": { "addr": { "transactions": [
                { "hash": "0xok", "balance_change": 7 },
                { "hash": 42, "balance_change": 7 }
            ] } } }"#,
        )
        .unwrap();
        assert!(matches!(parse_dashboard(&numeric_hash, "addr"), Err(ExplorerError::Shape(_))));

        let bad_change: Value = serde_json::from_str(
            r#"{ "data": { "addr": { "transactions": [{ "hash": "0x1", "balance_change": "lots" }] } } }"#,
        )
        .unwrap();
        assert!(matches!(parse_dashboard(&bad_change, "addr"), Err(ExplorerError::Shape(_))));
    }

    #[test]
    fn test_parse_address_summary() {
        let body: Value = serde_json::from_str(DASHBOARD).unwrap();

        let summary =
            parse_address_summary(&body, "0xabc0000000000000000000000000000000000001").unwrap();

        assert_eq!(
            summary,
            AddressSummary {
                balance: 5_000_000_000_000_000_000,
                transaction_count: 3
            }
        );
    }
}
