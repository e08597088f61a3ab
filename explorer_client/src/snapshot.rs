use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trace_core::ChainId;
use tracing::{info, warn};

use crate::blockchair::BlockchairProvider;
use crate::blockscout::BlockscoutProvider;
use crate::error::{ExplorerError, Result};
use crate::solscan::SolscanProvider;

/// Best-effort on-chain view of a wallet, attached to suspect reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Native units
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub tx_count: u64,
    pub provider: String,
}

impl Default for WalletSnapshot {
    fn default() -> Self {
        Self {
            balance: Decimal::ZERO,
            tx_count: 0,
            provider: "unknown".to_string(),
        }
    }
}

/// Reads balances through whichever explorer covers the chain
#[derive(Debug, Clone)]
pub struct WalletInspector {
    blockscout: BlockscoutProvider,
    solscan: SolscanProvider,
    blockchair: BlockchairProvider,
}

impl WalletInspector {
    pub fn new(
        blockscout: BlockscoutProvider,
        solscan: SolscanProvider,
        blockchair: BlockchairProvider,
    ) -> Self {
        Self {
            blockscout,
            solscan,
            blockchair,
        }
    }

    /// Snapshot `address` on `chain` (a name accepted by `normalize_chain`).
    ///
    /// Never fails: an unsupported chain or any provider error yields
    /// `WalletSnapshot::default()`.
    pub async fn snapshot(&self, chain: &str, address: &str) -> WalletSnapshot {
        let chain = match config_manager::normalize_chain(chain) {
            Ok(chain) => chain,
            Err(e) => {
                warn!("Wallet snapshot skipped: {}", e);
                return WalletSnapshot::default();
            }
        };

        match self.try_snapshot(&chain, address).await {
            Ok(snapshot) => {
                info!(
                    "Wallet snapshot for {} on {}: balance {} via {}",
                    address, chain, snapshot.balance, snapshot.provider
                );
                snapshot
            }
            Err(e) => {
                warn!("Wallet snapshot failed for {} on {}: {}", address, chain, e);
                WalletSnapshot::default()
            }
        }
    }

    async fn try_snapshot(&self, chain: &str, address: &str) -> Result<WalletSnapshot> {
        match chain {
            "base" => {
                let wei = self.blockscout.get_balance(address).await?;
                Ok(WalletSnapshot {
                    balance: scale(wei, ChainId::Base.decimals())?,
                    tx_count: 0,
                    provider: "Blockscout Base".to_string(),
                })
            }
            "solana" => {
                let lamports = self.solscan.get_lamports(address).await?;
                Ok(WalletSnapshot {
                    balance: scale(lamports, ChainId::Solana.decimals())?,
                    tx_count: 0,
                    provider: "Solscan".to_string(),
                })
            }
            "ethereum" | "bsc" => {
                let slug = if chain == "bsc" { "binance-smart-chain" } else { "ethereum" };
                let summary = self.blockchair.get_address_summary(slug, address).await?;
                Ok(WalletSnapshot {
                    balance: scale(summary.balance, 18)?,
                    tx_count: summary.transaction_count,
                    provider: "Blockchair".to_string(),
                })
            }
            other => Err(ExplorerError::Config(format!("No snapshot source for chain {}", other))),
        }
    }
}

fn scale(native: i128, decimals: u32) -> Result<Decimal> {
    Decimal::try_from_i128_with_scale(native, decimals)
        .map(|d| d.normalize())
        .map_err(|e| ExplorerError::Shape(format!("Balance {} out of range: {}", native, e)))
}
