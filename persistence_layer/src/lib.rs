use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sqlite_client;

pub use sqlite_client::SuspectStore;

/// Status given to every freshly reported suspect
pub const STATUS_UNDER_REVIEW: &str = "Under Review";

/// Format of `timestamp` in API records
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Risk tier for a reported wallet: 3 by default, 4 once it holds more
/// than 10 native units.
pub fn risk_tier(balance: Decimal) -> i64 {
    if balance > Decimal::TEN {
        4
    } else {
        3
    }
}

/// A suspect report about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewSuspect {
    pub address: String,
    pub chain: String,
    pub risk_score: i64,
    pub impact_usd: f64,
    pub status: String,
    pub evidence_link: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NewSuspect {
    pub fn new(address: impl Into<String>, chain: impl Into<String>, risk_score: i64) -> Self {
        Self {
            address: address.into(),
            chain: chain.into(),
            risk_score,
            impact_usd: 0.0,
            status: STATUS_UNDER_REVIEW.to_string(),
            evidence_link: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_impact(mut self, impact_usd: f64) -> Self {
        self.impact_usd = impact_usd;
        self
    }

    pub fn with_evidence(mut self, evidence_link: Option<String>) -> Self {
        self.evidence_link = evidence_link;
        self
    }
}

/// A stored suspect row
#[derive(Debug, Clone, PartialEq)]
pub struct Suspect {
    pub id: i64,
    pub address: String,
    pub chain: String,
    pub risk_score: i64,
    pub impact_usd: f64,
    pub status: String,
    pub evidence_link: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Public shape of a suspect in `/api/recent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspectRecord {
    pub id: i64,
    pub address: String,
    pub chain: String,
    pub tier: i64,
    pub status: String,
    pub impact: f64,
    pub timestamp: String,
}

impl Suspect {
    pub fn to_record(&self) -> SuspectRecord {
        SuspectRecord {
            id: self.id,
            address: self.address.clone(),
            chain: self.chain.clone(),
            tier: self.risk_score,
            status: self.status.clone(),
            impact: self.impact_usd,
            timestamp: self.timestamp.format(RECORD_TIME_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_risk_tier_threshold() {
        assert_eq!(risk_tier(Decimal::ZERO), 3);
        assert_eq!(risk_tier(dec!(10)), 3);
        assert_eq!(risk_tier(dec!(10.0001)), 4);
    }

    #[test]
    fn test_record_shape() {
        let suspect = Suspect {
            id: 7,
            address: "0xabc".to_string(),
            chain: "base".to_string(),
            risk_score: 4,
            impact_usd: 1250.5,
            status: STATUS_UNDER_REVIEW.to_string(),
            evidence_link: Some("https://example.com/thread".to_string()),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap(),
        };

        let record = suspect.to_record();

        assert_eq!(record.tier, 4);
        assert_eq!(record.impact, 1250.5);
        assert_eq!(record.timestamp, "2024-03-09 14:05");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("evidence_link").is_none());
        assert_eq!(json["status"], "Under Review");
    }

    #[test]
    fn test_new_suspect_defaults() {
        let suspect = NewSuspect::new("So1", "solana", 3);
        assert_eq!(suspect.status, STATUS_UNDER_REVIEW);
        assert_eq!(suspect.impact_usd, 0.0);
        assert!(suspect.evidence_link.is_none());
    }
}
