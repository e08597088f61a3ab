use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ProviderFailure;
use crate::model::{ChainId, ProviderKind, ProviderResult};
use crate::provider::TransactionProvider;

#[derive(Debug, Clone, Copy)]
pub struct FailoverPolicy {
    /// Fall back to the backup when the primary succeeds with an empty list
    pub treat_empty_as_failure: bool,
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self {
            treat_empty_as_failure: true,
        }
    }
}

/// Picks the primary adapter for a chain and falls back to the backup once.
#[derive(Clone, Default)]
pub struct ProviderSelector {
    primaries: HashMap<ChainId, Arc<dyn TransactionProvider>>,
    backup: Option<Arc<dyn TransactionProvider>>,
    policy: FailoverPolicy,
}

impl ProviderSelector {
    pub fn new(policy: FailoverPolicy) -> Self {
        Self {
            primaries: HashMap::new(),
            backup: None,
            policy,
        }
    }

    pub fn with_primary(mut self, chain: ChainId, provider: Arc<dyn TransactionProvider>) -> Self {
        self.primaries.insert(chain, provider);
        self
    }

    pub fn with_backup(mut self, provider: Arc<dyn TransactionProvider>) -> Self {
        self.backup = Some(provider);
        self
    }

    pub fn policy(&self) -> FailoverPolicy {
        self.policy
    }

    pub async fn resolve(&self, chain: ChainId, address: &str) -> ProviderResult {
        let primary_result = match self.primaries.get(&chain) {
            Some(primary) => {
                debug!("Resolving {} on {} via {}", address, chain, primary.name());
                primary.fetch(chain, address).await
            }
            None => ProviderResult::Failure {
                kind: ProviderKind::primary_for(chain),
                reason: ProviderFailure::Unsupported(chain.to_string()),
            },
        };

        if !self.needs_failover(&primary_result) {
            return primary_result;
        }

        let Some(backup) = &self.backup else {
            return primary_result;
        };

        match &primary_result {
            ProviderResult::Failure { reason, .. } => {
                warn!("Primary provider failed for {} on {}: {} - failing over to {}", address, chain, reason, backup.name());
            }
            ProviderResult::Success { .. } => {
                warn!("Primary provider returned no transactions for {} on {} - failing over to {}", address, chain, backup.name());
            }
        }

        match backup.fetch(chain, address).await {
            ProviderResult::Success { transactions, .. } => ProviderResult::Success {
                kind: ProviderKind::Backup,
                transactions,
            },
            ProviderResult::Failure { reason, .. } => ProviderResult::Failure {
                kind: ProviderKind::Backup,
                reason,
            },
        }
    }

    fn needs_failover(&self, result: &ProviderResult) -> bool {
        match result {
            ProviderResult::Failure { .. } => true,
            ProviderResult::Success { transactions, .. } => {
                transactions.is_empty() && self.policy.treat_empty_as_failure
            }
        }
    }
}
