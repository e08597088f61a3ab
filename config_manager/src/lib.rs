use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// General system settings
    pub system: SystemSettings,

    /// API server configuration
    pub api: ApiConfig,

    /// Suspect ledger database
    pub database: DatabaseConfig,

    /// Trace engine limits and thresholds
    pub trace: TraceConfig,

    /// Blockscout explorer (primary for Base)
    pub blockscout: ExplorerConfig,

    /// Solscan explorer (primary for Solana)
    pub solscan: ExplorerConfig,

    /// Blockchair dashboards (backup for every chain)
    pub blockchair: ExplorerConfig,

    /// Mock payment gate in front of the trace endpoint
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Enable debug mode
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Depth used when a request does not name one
    pub default_depth: u32,

    /// Largest depth a request may ask for
    pub max_depth: u32,

    /// Delay after each hop's fetch in milliseconds (shared provider rate limits)
    pub pacing_ms: u64,

    /// Wall-clock budget for one trace, checked between hops (0 disables it)
    pub deadline_seconds: u64,

    /// Fall back to the backup provider when the primary returns an empty list
    pub treat_empty_primary_as_failure: bool,

    /// Whale threshold for EVM chains in native display units (ETH)
    pub evm_whale_threshold: f64,

    /// Whale threshold for Solana in SOL
    pub solana_whale_threshold: f64,
}

/// Connection settings for one explorer API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// API base URL
    pub api_base_url: String,

    /// API key or token; `None` when not provisioned
    pub api_key: Option<String>,

    /// Treat calls without a key as failed instead of sending them unauthenticated
    pub require_api_key: bool,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Number of transactions requested per call
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Require an X-PAYMENT header on /api/trace
    pub enabled: bool,

    /// Address payments are directed to
    pub pay_to: String,

    /// Price of one trace in the asset's smallest unit
    pub max_amount_required: String,

    /// Asset contract or mint
    pub asset: String,

    pub network: String,

    pub description: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system: SystemSettings { debug_mode: false },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://local.db".to_string(),
                max_connections: 5,
            },
            trace: TraceConfig {
                default_depth: 3,
                max_depth: 10,
                pacing_ms: 1000,        // 1 request per second across primary + backup
                deadline_seconds: 60,
                treat_empty_primary_as_failure: true,
                evm_whale_threshold: 50.0,
                solana_whale_threshold: 1000.0,
            },
            blockscout: ExplorerConfig {
                api_base_url: "https://base.blockscout.com".to_string(),
                api_key: None, // Optional, raises rate limits
                require_api_key: false,
                request_timeout_seconds: 10,
                page_size: 100,
            },
            solscan: ExplorerConfig {
                api_base_url: "https://public-api.solscan.io".to_string(),
                api_key: None, // Must be set in .env or config file
                require_api_key: true,
                request_timeout_seconds: 10,
                page_size: 50,
            },
            blockchair: ExplorerConfig {
                api_base_url: "https://api.blockchair.com".to_string(),
                api_key: None, // Must be set in .env or config file
                require_api_key: true,
                request_timeout_seconds: 10,
                page_size: 100,
            },
            payment: PaymentConfig {
                enabled: true,
                pay_to: "0x0000000000000000000000000000000000000000".to_string(),
                max_amount_required: "10000".to_string(), // 0.01 USDC
                asset: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(), // USDC on Base
                network: "base".to_string(),
                description: "Backward fund trace".to_string(),
            },
        }
    }
}

impl ExplorerConfig {
    /// Validate explorer configuration
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(format!(
                "{} API base URL is required",
                name
            )));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(format!(
                "{} request timeout must be greater than 0",
                name
            )));
        }

        if self.page_size == 0 {
            return Err(ConfigurationError::InvalidValue(format!(
                "{} page size must be greater than 0",
                name
            )));
        }

        // A missing key only disables the provider at call time
        if self.require_api_key && self.credential().is_none() {
            warn!("{} API key is not configured, calls will fail over", name);
        }

        Ok(())
    }

    /// The configured key, ignoring blank values
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl TraceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_depth > self.max_depth {
            return Err(ConfigurationError::InvalidValue(format!(
                "Default depth {} exceeds max depth {}",
                self.default_depth, self.max_depth
            )));
        }

        if self.evm_whale_threshold <= 0.0 || self.solana_whale_threshold <= 0.0 {
            return Err(ConfigurationError::InvalidValue(
                "Whale thresholds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-trace time budget, `None` when `deadline_seconds` is 0
    pub fn deadline(&self) -> Option<Duration> {
        match self.deadline_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        }
    }
}

impl SystemConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        // Add config file if it exists
        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        // Add environment variables with prefix
        config_builder = config_builder.add_source(
            Environment::with_prefix("TRACER")
                .try_parsing(true)
                .separator("__"),
        );

        let mut system_config: SystemConfig = config_builder.build()?.try_deserialize()?;
        system_config.apply_legacy_env(|name| std::env::var(name).ok());

        // Validate configuration
        system_config.validate()?;

        Ok(system_config)
    }

    /// Fill unset credentials from the variable names used by earlier deployments
    fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (explorer, variable) in [
            (&mut self.blockscout, "BLOCKSCOUT_API_KEY"),
            (&mut self.solscan, "SOLSCAN_API_KEY"),
            (&mut self.blockchair, "BLOCKCHAIR_API_KEY"),
        ] {
            if explorer.credential().is_none() {
                if let Some(key) = lookup(variable).filter(|key| !key.trim().is_empty()) {
                    debug!("Using {} for explorer credential", variable);
                    explorer.api_key = Some(key);
                }
            }
        }

        if self.database.url == SystemConfig::default().database.url {
            if let Some(url) = lookup("DATABASE_URL") {
                debug!("Using DATABASE_URL for suspect ledger");
                self.database.url = url;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate individual components
        self.blockscout.validate("Blockscout")?;
        self.solscan.validate("Solscan")?;
        self.blockchair.validate("Blockchair")?;
        self.trace.validate()?;

        if self.api.port == 0 {
            return Err(ConfigurationError::InvalidValue(
                "API port cannot be 0".to_string(),
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Database URL is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Normalize user-supplied chain names
///
/// - "sol" -> "solana"
/// - "eth" -> "ethereum"
/// - "binance-smart-chain" / "bnb" -> "bsc"
pub fn normalize_chain(input: &str) -> std::result::Result<String, String> {
    match input.trim().to_lowercase().as_str() {
        "solana" | "sol" => Ok("solana".to_string()),
        "ethereum" | "eth" => Ok("ethereum".to_string()),
        "base" => Ok("base".to_string()),
        "binance" | "bsc" | "binance-smart-chain" | "bnb" | "binance smart chain" => {
            Ok("bsc".to_string())
        }
        _ => Err(format!("Unsupported chain: '{}'", input)),
    }
}
