use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ProviderFailure, TraceError};

/// `funded_by` value for hops built from the backup tier, which cannot name the sender
pub const BACKUP_SENDER_SENTINEL: &str = "Unknown (see explorer)";

/// `funded_by` value of the trailing marker after a backup-sourced hop
pub const EXTERNAL_EXPLORER_SENTINEL: &str = "See external explorer";

/// `funded_by` value of the trailing marker after a whale hop
pub const WHALE_SENTINEL: &str = "Whale / exchange";

/// Chains the tracer can walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    /// Base mainnet (EVM)
    Base,
    Solana,
}

impl ChainId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Base => "base",
            ChainId::Solana => "solana",
        }
    }

    pub fn supported() -> [ChainId; 2] {
        [ChainId::Base, ChainId::Solana]
    }

    /// Decimal places between the smallest native unit and the display unit
    pub fn decimals(&self) -> u32 {
        match self {
            ChainId::Base => 18,
            ChainId::Solana => 9,
        }
    }

    pub fn native_symbol(&self) -> &'static str {
        match self {
            ChainId::Base => "ETH",
            ChainId::Solana => "SOL",
        }
    }

    pub fn is_evm(&self) -> bool {
        matches!(self, ChainId::Base)
    }

    /// Funding amounts above this (in display units) are treated as exchange-sized
    pub fn default_whale_threshold(&self) -> Decimal {
        match self {
            ChainId::Base => Decimal::from(50),
            ChainId::Solana => Decimal::from(1000),
        }
    }

    /// Public explorer page for an address, used when the trail has to be followed by hand
    pub fn explorer_url(&self, address: &str) -> String {
        match self {
            ChainId::Base => format!("https://basescan.org/address/{}", address),
            ChainId::Solana => format!("https://solscan.io/account/{}", address),
        }
    }

    /// Convert an amount in wei / lamports to display units.
    pub fn to_display_amount(&self, native: i128) -> Option<Decimal> {
        match Decimal::try_from_i128_with_scale(native, self.decimals()) {
            Ok(amount) => Some(amount.normalize()),
            // Beyond the 96-bit mantissa; precision no longer matters at that size
            Err(_) => Decimal::from_f64_retain(native as f64 / 10f64.powi(self.decimals() as i32))
                .map(|d| d.round_dp(self.decimals())),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" | "base-mainnet" => Ok(ChainId::Base),
            "solana" | "sol" => Ok(ChainId::Solana),
            _ => Err(TraceError::InvalidInput(format!("Unsupported chain: '{}'", s))),
        }
    }
}

/// Sender of a transaction as far as the provider can tell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counterparty {
    Known(String),
    Unknown,
}

impl Counterparty {
    pub fn address(&self) -> Option<&str> {
        match self {
            Counterparty::Known(address) => Some(address.as_str()),
            Counterparty::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
    Unknown,
}

/// Provider-independent view of one transaction touching the queried wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTransaction {
    pub hash: String,
    pub counterparty: Counterparty,
    /// Smallest native unit (wei / lamport); `None` when the provider withholds it
    pub amount_native: Option<i128>,
    pub direction: Direction,
}

impl CanonicalTransaction {
    pub fn incoming(hash: impl Into<String>, from: impl Into<String>, amount_native: Option<i128>) -> Self {
        Self {
            hash: hash.into(),
            counterparty: Counterparty::Known(from.into()),
            amount_native,
            direction: Direction::Incoming,
        }
    }

    fn possibly_incoming(&self) -> bool {
        matches!(self.direction, Direction::Incoming | Direction::Unknown)
    }

    fn has_positive_amount(&self) -> bool {
        self.amount_native.is_some_and(|amount| amount > 0)
    }

    /// Whether this transaction can explain where `wallet` got its funds from,
    /// under the selection rule of the provider tier that produced it.
    pub fn is_funding_candidate(&self, kind: ProviderKind, wallet: &str) -> bool {
        match kind {
            ProviderKind::PrimaryEvm => {
                self.direction == Direction::Incoming
                    && self.counterparty.address().is_some()
                    && self.has_positive_amount()
            }
            ProviderKind::PrimarySolana => {
                self.possibly_incoming()
                    && self
                        .counterparty
                        .address()
                        .is_some_and(|sender| sender != wallet)
            }
            ProviderKind::Backup => self.possibly_incoming() && self.has_positive_amount(),
        }
    }
}

/// Which adapter produced a batch of transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    PrimaryEvm,
    PrimarySolana,
    /// Dashboard-style aggregator; lossier, never discloses the sender
    Backup,
}

impl ProviderKind {
    pub fn primary_for(chain: ChainId) -> Self {
        match chain {
            ChainId::Base => ProviderKind::PrimaryEvm,
            ChainId::Solana => ProviderKind::PrimarySolana,
        }
    }

    pub fn is_backup(&self) -> bool {
        matches!(self, ProviderKind::Backup)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::PrimaryEvm => "primary_evm",
            ProviderKind::PrimarySolana => "primary_solana",
            ProviderKind::Backup => "backup",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one adapter call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult {
    Success {
        kind: ProviderKind,
        transactions: Vec<CanonicalTransaction>,
    },
    Failure {
        kind: ProviderKind,
        reason: ProviderFailure,
    },
}

impl ProviderResult {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderResult::Success { kind, .. } | ProviderResult::Failure { kind, .. } => *kind,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProviderResult::Failure { .. })
    }

    /// Success with at least one transaction
    pub fn has_transactions(&self) -> bool {
        matches!(self, ProviderResult::Success { transactions, .. } if !transactions.is_empty())
    }
}

/// Serialized `amount` of a hop: a number in display units, or a marker
/// string such as `"Unknown (SOL)"` when the provider withheld it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HopAmount {
    Known(#[serde(with = "rust_decimal::serde::float")] Decimal),
    Marker(String),
}

impl HopAmount {
    pub fn unknown(chain: ChainId) -> Self {
        HopAmount::Marker(format!("Unknown ({})", chain.native_symbol()))
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            HopAmount::Known(amount) => Some(*amount),
            HopAmount::Marker(_) => None,
        }
    }
}

/// One step of the backward walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHop {
    pub step: u32,
    pub wallet: String,
    pub funded_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<HopAmount>,
    pub tx_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TraceHop {
    /// Trailing informational hop (whale flag, backup notice)
    pub fn marker(step: u32, wallet: impl Into<String>, funded_by: &str, info: String) -> Self {
        Self {
            step,
            wallet: wallet.into(),
            funded_by: funded_by.to_string(),
            amount: None,
            tx_hash: String::new(),
            info: Some(info),
            note: None,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.info.is_some()
    }
}

/// Why the walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    DepthExhausted,
    /// Primary and backup returned nothing usable
    NoProviderData,
    /// Data came back but none of it is an incoming funding transfer
    NoCandidate,
    WhaleDetected,
    BackupReached,
    /// Deadline passed between hops
    Cancelled,
}

impl Termination {
    /// Terminations that append a trailing marker hop
    pub fn has_marker(&self) -> bool {
        matches!(self, Termination::WhaleDetected | Termination::BackupReached)
    }
}

/// Result of one trace invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceOutcome {
    pub trace_id: Uuid,
    pub chain: ChainId,
    pub start_address: String,
    pub requested_depth: u32,
    pub hops: Vec<TraceHop>,
    pub termination: Termination,
}
