use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::{NewSuspect, PersistenceError, Result, Suspect};

const CREATE_SUSPECTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS suspects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        address TEXT NOT NULL,
        chain TEXT NOT NULL,
        risk_score INTEGER NOT NULL DEFAULT 1,
        impact_usd REAL NOT NULL DEFAULT 0.0,
        status TEXT NOT NULL DEFAULT 'Under Review',
        evidence_link TEXT,
        timestamp TEXT NOT NULL
    )
"#;

/// SQLite ledger of community-reported suspect wallets
#[derive(Debug, Clone)]
pub struct SuspectStore {
    pool: SqlitePool,
}

impl SuspectStore {
    /// Open (creating if missing) the database at `database_url` and make
    /// sure the `suspects` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidUrl(format!("{}: {}", database_url, e)))?
            .create_if_missing(true);

        // Every connection to an in-memory database sees its own empty
        // database, so the pool must hold exactly one that never expires.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_SUSPECTS_TABLE).execute(&pool).await?;

        info!("Suspect ledger ready (in memory: {})", in_memory);
        Ok(Self { pool })
    }

    /// Store a report and return its id
    pub async fn insert(&self, suspect: &NewSuspect) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO suspects (address, chain, risk_score, impact_usd, status, evidence_link, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&suspect.address)
        .bind(&suspect.chain)
        .bind(suspect.risk_score)
        .bind(suspect.impact_usd)
        .bind(&suspect.status)
        .bind(&suspect.evidence_link)
        .bind(suspect.timestamp)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Stored suspect {} on {} as #{}", suspect.address, suspect.chain, id);
        Ok(id)
    }

    /// Newest reports first
    pub async fn recent(&self, limit: u32) -> Result<Vec<Suspect>> {
        let rows = sqlx::query(
            r#"
            SELECT id, address, chain, risk_score, impact_usd, status, evidence_link, timestamp
            FROM suspects
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<Suspect> {
                Ok(Suspect {
                    id: row.try_get("id")?,
                    address: row.try_get("address")?,
                    chain: row.try_get("chain")?,
                    risk_score: row.try_get("risk_score")?,
                    impact_usd: row.try_get("impact_usd")?,
                    status: row.try_get("status")?,
                    evidence_link: row.try_get("evidence_link")?,
                    timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
                })
            })
            .collect()
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
