use thiserror::Error;
use trace_core::ProviderFailure;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Missing API key for {provider}")]
    MissingApiKey { provider: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

impl From<ExplorerError> for ProviderFailure {
    fn from(error: ExplorerError) -> Self {
        match error {
            ExplorerError::Http(e) if e.is_timeout() => ProviderFailure::Timeout(e.to_string()),
            ExplorerError::Http(e) if e.is_decode() => ProviderFailure::Decode(e.to_string()),
            ExplorerError::Http(e) => ProviderFailure::Network(e.to_string()),
            ExplorerError::Json(e) => ProviderFailure::Decode(e.to_string()),
            ExplorerError::Api { status, message } => ProviderFailure::Status { status, message },
            ExplorerError::Shape(message) => ProviderFailure::Shape(message),
            ExplorerError::MissingApiKey { provider } => {
                ProviderFailure::MissingCredential { provider }
            }
            ExplorerError::Config(message) => ProviderFailure::Network(message),
        }
    }
}
