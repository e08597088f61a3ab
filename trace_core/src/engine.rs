use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{Result, TraceError};
use crate::model::{
    ChainId, HopAmount, ProviderKind, ProviderResult, Termination, TraceHop, TraceOutcome,
    BACKUP_SENDER_SENTINEL, EXTERNAL_EXPLORER_SENTINEL, WHALE_SENTINEL,
};
use crate::provider::Pacer;
use crate::selector::ProviderSelector;

#[derive(Debug, Clone)]
pub struct TraceSettings {
    /// Largest depth a caller may request
    pub max_depth_cap: u32,
    pub evm_whale_threshold: Decimal,
    pub solana_whale_threshold: Decimal,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            max_depth_cap: 10,
            evm_whale_threshold: ChainId::Base.default_whale_threshold(),
            solana_whale_threshold: ChainId::Solana.default_whale_threshold(),
        }
    }
}

impl TraceSettings {
    pub fn whale_threshold(&self, chain: ChainId) -> Decimal {
        match chain {
            ChainId::Base => self.evm_whale_threshold,
            ChainId::Solana => self.solana_whale_threshold,
        }
    }
}

/// Walks a wallet's incoming funds backwards, one hop at a time.
///
/// The engine keeps no state between invocations, so one instance can be
/// shared behind an `Arc` by any number of concurrent traces.
pub struct TraceEngine {
    selector: ProviderSelector,
    pacer: Arc<dyn Pacer>,
    settings: TraceSettings,
}

impl TraceEngine {
    pub fn new(selector: ProviderSelector, pacer: Arc<dyn Pacer>, settings: TraceSettings) -> Self {
        Self {
            selector,
            pacer,
            settings,
        }
    }

    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    pub async fn trace(&self, start_address: &str, chain: ChainId, max_depth: u32) -> Result<TraceOutcome> {
        self.trace_until(start_address, chain, max_depth, None).await
    }

    /// Trace with an optional deadline, checked between hops only. When it
    /// passes, the hops gathered so far are returned.
    pub async fn trace_until(
        &self,
        start_address: &str,
        chain: ChainId,
        max_depth: u32,
        deadline: Option<Instant>,
    ) -> Result<TraceOutcome> {
        let start_address = start_address.trim();
        if start_address.is_empty() {
            return Err(TraceError::InvalidInput("Address must not be empty".to_string()));
        }
        if max_depth > self.settings.max_depth_cap {
            return Err(TraceError::InvalidInput(format!(
                "Depth {} exceeds maximum of {}",
                max_depth, self.settings.max_depth_cap
            )));
        }

        let trace_id = Uuid::new_v4();
        let span = info_span!("trace", %trace_id, %chain, address = %start_address);

        let (hops, termination) = self
            .walk(start_address, chain, max_depth, deadline)
            .instrument(span)
            .await;

        Ok(TraceOutcome {
            trace_id,
            chain,
            start_address: start_address.to_string(),
            requested_depth: max_depth,
            hops,
            termination,
        })
    }

    async fn walk(
        &self,
        start_address: &str,
        chain: ChainId,
        max_depth: u32,
        deadline: Option<Instant>,
    ) -> (Vec<TraceHop>, Termination) {
        let mut hops = Vec::new();
        let mut current_wallet = start_address.to_string();

        info!("Starting trace with depth {}", max_depth);

        for step in 1..=max_depth {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!("Trace deadline reached before hop {}, returning {} hops", step, hops.len());
                return (hops, Termination::Cancelled);
            }

            let result = self.selector.resolve(chain, &current_wallet).await;
            self.pacer.pause().await;

            let (kind, transactions) = match result {
                ProviderResult::Success { kind, transactions } if !transactions.is_empty() => {
                    (kind, transactions)
                }
                ProviderResult::Success { kind, .. } => {
                    info!("Hop {}: {} returned no transactions for {}", step, kind, current_wallet);
                    return (hops, Termination::NoProviderData);
                }
                ProviderResult::Failure { kind, reason } => {
                    warn!("Hop {}: no provider data for {} ({}: {})", step, current_wallet, kind, reason);
                    return (hops, Termination::NoProviderData);
                }
            };

            debug!("Hop {}: scanning {} transactions from {}", step, transactions.len(), kind);

            let Some(candidate) = transactions
                .iter()
                .find(|tx| tx.is_funding_candidate(kind, &current_wallet))
            else {
                info!("Hop {}: no incoming funding found for {}", step, current_wallet);
                return (hops, Termination::NoCandidate);
            };

            let display_amount = candidate
                .amount_native
                .and_then(|native| chain.to_display_amount(native));
            let amount = match display_amount {
                Some(value) => HopAmount::Known(value),
                None => HopAmount::unknown(chain),
            };

            if kind.is_backup() {
                info!("Hop {}: backup endpoint reached for {}, stopping", step, current_wallet);
                let explorer_url = chain.explorer_url(&current_wallet);
                hops.push(TraceHop {
                    step,
                    wallet: current_wallet.clone(),
                    funded_by: BACKUP_SENDER_SENTINEL.to_string(),
                    amount: Some(amount),
                    tx_hash: candidate.hash.clone(),
                    info: None,
                    note: Some("Sender not disclosed by backup endpoint".to_string()),
                });
                hops.push(TraceHop::marker(
                    step + 1,
                    current_wallet,
                    EXTERNAL_EXPLORER_SENTINEL,
                    format!("Backup endpoint reached, see external explorer: {}", explorer_url),
                ));
                return (hops, Termination::BackupReached);
            }

            // Primary candidates always carry a sender
            let Some(funder) = candidate.counterparty.address().map(str::to_string) else {
                return (hops, Termination::NoCandidate);
            };

            info!("Hop {}: {} funded by {} ({:?})", step, current_wallet, funder, amount);

            let note = (kind == ProviderKind::PrimarySolana)
                .then(|| "Funder inferred from first signer (fee payer)".to_string());
            hops.push(TraceHop {
                step,
                wallet: current_wallet,
                funded_by: funder.clone(),
                amount: Some(amount),
                tx_hash: candidate.hash.clone(),
                info: None,
                note,
            });

            let threshold = self.settings.whale_threshold(chain);
            if let Some(value) = display_amount.filter(|value| *value > threshold) {
                info!("Hop {}: whale detected at {} ({} {})", step, funder, value, chain.native_symbol());
                hops.push(TraceHop::marker(
                    step + 1,
                    funder.clone(),
                    WHALE_SENTINEL,
                    format!(
                        "Whale detected: {} sent {} {} (threshold {}), likely an exchange or institutional wallet",
                        funder,
                        value,
                        chain.native_symbol(),
                        threshold
                    ),
                ));
                return (hops, Termination::WhaleDetected);
            }

            current_wallet = funder;
        }

        info!("Trace reached requested depth {}", max_depth);
        (hops, Termination::DepthExhausted)
    }
}
