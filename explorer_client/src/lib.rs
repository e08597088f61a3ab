pub mod blockchair;
pub mod blockscout;
pub mod error;
pub mod fetcher;
pub mod snapshot;
pub mod solscan;
pub mod types;

pub use blockchair::{AddressSummary, BlockchairProvider};
pub use blockscout::BlockscoutProvider;
pub use error::{ExplorerError, Result};
pub use fetcher::{Auth, FixedDelayPacer, HttpFetcher, USER_AGENT};
pub use snapshot::{WalletInspector, WalletSnapshot};
pub use solscan::SolscanProvider;

use config_manager::{SystemConfig, TraceConfig};
use rust_decimal::Decimal;
use std::sync::Arc;
use trace_core::{ChainId, FailoverPolicy, ProviderSelector, TraceEngine, TraceSettings};
use tracing::info;

/// One configured adapter per explorer, shared by the trace engine and the
/// wallet inspector.
#[derive(Debug, Clone)]
pub struct ExplorerClients {
    pub blockscout: BlockscoutProvider,
    pub solscan: SolscanProvider,
    pub blockchair: BlockchairProvider,
}

impl ExplorerClients {
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        Ok(Self {
            blockscout: BlockscoutProvider::new(config.blockscout.clone())?,
            solscan: SolscanProvider::new(config.solscan.clone())?,
            blockchair: BlockchairProvider::new(config.blockchair.clone())?,
        })
    }

    /// Blockscout for Base, Solscan for Solana, Blockchair behind both
    pub fn selector(&self, policy: FailoverPolicy) -> ProviderSelector {
        ProviderSelector::new(policy)
            .with_primary(ChainId::Base, Arc::new(self.blockscout.clone()))
            .with_primary(ChainId::Solana, Arc::new(self.solscan.clone()))
            .with_backup(Arc::new(self.blockchair.clone()))
    }

    pub fn trace_engine(&self, trace: &TraceConfig) -> Result<TraceEngine> {
        let policy = FailoverPolicy {
            treat_empty_as_failure: trace.treat_empty_primary_as_failure,
        };
        let settings = TraceSettings {
            max_depth_cap: trace.max_depth,
            evm_whale_threshold: threshold(trace.evm_whale_threshold, "evm_whale_threshold")?,
            solana_whale_threshold: threshold(trace.solana_whale_threshold, "solana_whale_threshold")?,
        };

        info!(
            "Trace engine: max depth {}, pacing {}ms, whale thresholds {} / {}",
            settings.max_depth_cap,
            trace.pacing_ms,
            settings.evm_whale_threshold,
            settings.solana_whale_threshold
        );

        Ok(TraceEngine::new(
            self.selector(policy),
            Arc::new(FixedDelayPacer::from_millis(trace.pacing_ms)),
            settings,
        ))
    }

    pub fn wallet_inspector(&self) -> WalletInspector {
        WalletInspector::new(
            self.blockscout.clone(),
            self.solscan.clone(),
            self.blockchair.clone(),
        )
    }
}

fn threshold(value: f64, name: &str) -> Result<Decimal> {
    Decimal::from_f64_retain(value)
        .map(|d| d.normalize())
        .ok_or_else(|| ExplorerError::Config(format!("{} is not a finite number: {}", name, value)))
}

/// Build the production trace engine straight from configuration
pub fn build_trace_engine(config: &SystemConfig) -> Result<TraceEngine> {
    ExplorerClients::from_config(config)?.trace_engine(&config.trace)
}
