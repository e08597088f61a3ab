//! Fund-tracing core: the canonical transaction model, the provider
//! abstraction with its failover policy, and the backward-walk engine.

pub mod engine;
pub mod error;
pub mod model;
pub mod provider;
pub mod selector;

pub use engine::{TraceEngine, TraceSettings};
pub use error::{ProviderFailure, Result, TraceError};
pub use model::{
    CanonicalTransaction, ChainId, Counterparty, Direction, HopAmount, ProviderKind,
    ProviderResult, Termination, TraceHop, TraceOutcome, BACKUP_SENDER_SENTINEL,
    EXTERNAL_EXPLORER_SENTINEL, WHALE_SENTINEL,
};
pub use provider::{NoPacing, Pacer, TransactionProvider};
pub use selector::{FailoverPolicy, ProviderSelector};
