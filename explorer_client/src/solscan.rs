use async_trait::async_trait;
use config_manager::ExplorerConfig;
use serde_json::Value;
use trace_core::{
    CanonicalTransaction, ChainId, Counterparty, Direction, ProviderFailure, ProviderKind,
    ProviderResult, TransactionProvider,
};
use tracing::{debug, info, warn};

use crate::error::{ExplorerError, Result};
use crate::fetcher::{Auth, HttpFetcher};
use crate::types::{native_amount, SolscanTransaction};

const PROVIDER_NAME: &str = "Solscan";

/// Primary Solana adapter over the Solscan account API
#[derive(Debug, Clone)]
pub struct SolscanProvider {
    fetcher: HttpFetcher,
    config: ExplorerConfig,
}

impl SolscanProvider {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self { fetcher, config })
    }

    fn base_url(&self) -> &str {
        self.config.api_base_url.trim_end_matches('/')
    }

    fn auth(&self) -> Result<Auth> {
        Auth::from_config(&self.config, PROVIDER_NAME, |key| Auth::Header {
            name: "token",
            value: key,
        })
    }

    pub async fn get_account_transactions(&self, address: &str) -> Result<Vec<CanonicalTransaction>> {
        let auth = self.auth()?;
        let url = format!("{}/account/transactions", self.base_url());
        let query = [
            ("account", address.to_string()),
            ("limit", self.config.page_size.to_string()),
        ];

        let body = self.fetcher.get_json(&url, &query, &auth).await?;
        parse_account_transactions(&body, address)
    }

    /// Account balance in lamports
    pub async fn get_lamports(&self, address: &str) -> Result<i128> {
        let auth = self.auth()?;
        let url = format!("{}/account/{}", self.base_url(), address);

        let body = self.fetcher.get_json(&url, &[], &auth).await?;
        parse_lamports(&body)
    }
}

/// Map an account transaction list to canonical transactions.
///
/// Solscan does not expose the parsed transfer at this tier, so the first
/// signer (the fee payer) stands in for the sender and the amount is unknown.
pub fn parse_account_transactions(body: &Value, address: &str) -> Result<Vec<CanonicalTransaction>> {
    let entries = match body {
        Value::Array(entries) => entries.clone(),
        _ => match body.get("data") {
            Some(Value::Array(entries)) => entries.clone(),
            _ => {
                return Err(ExplorerError::Shape(
                    "account transactions response is not a list".to_string(),
                ))
            }
        },
    };

    let entries: Vec<SolscanTransaction> = serde_json::from_value(Value::Array(entries))
        .map_err(|e| ExplorerError::Shape(format!("Invalid account transaction: {}", e)))?;
    if entries.iter().any(|entry| entry.tx_hash.trim().is_empty()) {
        return Err(ExplorerError::Shape("account transaction has an empty hash".to_string()));
    }
    let total = entries.len();

    let transactions: Vec<CanonicalTransaction> = entries
        .into_iter()
        .filter(|entry| entry.has_fee_detail())
        .filter_map(|entry| {
            let fee_payer = entry.signer.first()?.clone();
            let direction = if fee_payer != address {
                Direction::Incoming
            } else {
                Direction::Outgoing
            };
            Some(CanonicalTransaction {
                hash: entry.tx_hash,
                counterparty: Counterparty::Known(fee_payer),
                amount_native: None,
                direction,
            })
        })
        .collect();

    debug!("Solscan: kept {} of {} transactions with signer detail", transactions.len(), total);
    Ok(transactions)
}

fn parse_lamports(body: &Value) -> Result<i128> {
    body.get("lamports")
        .or_else(|| body.get("data").and_then(|data| data.get("lamports")))
        .and_then(native_amount)
        .ok_or_else(|| ExplorerError::Shape("account response has no lamports".to_string()))
}

#[async_trait]
impl TransactionProvider for SolscanProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::PrimarySolana
    }

    async fn fetch(&self, chain: ChainId, address: &str) -> ProviderResult {
        if chain != ChainId::Solana {
            return ProviderResult::Failure {
                kind: self.kind(),
                reason: ProviderFailure::Unsupported(chain.to_string()),
            };
        }

        match self.get_account_transactions(address).await {
            Ok(transactions) => {
                info!("Solscan: {} transactions for {}", transactions.len(), address);
                ProviderResult::Success {
                    kind: self.kind(),
                    transactions,
                }
            }
            Err(e) => {
                warn!("Solscan fetch failed for {}: {}", address, e);
                ProviderResult::Failure {
                    kind: self.kind(),
                    reason: e.into(),
                }
            }
        }
    }
}
