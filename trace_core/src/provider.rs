use async_trait::async_trait;

use crate::model::{ChainId, ProviderKind, ProviderResult};

/// A (chain, provider) adapter that maps an explorer API into canonical transactions.
///
/// Implementations must not let errors escape: every network, decode or shape
/// problem comes back as `ProviderResult::Failure`.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Human-readable provider name for logs
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    async fn fetch(&self, chain: ChainId, address: &str) -> ProviderResult;
}

/// Delay applied by the engine after each hop's fetch, shared by the primary
/// and backup attempts of that hop.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Pacer that never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self) {}
}
