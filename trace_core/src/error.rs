use thiserror::Error;

/// Why a provider could not produce usable data for a hop.
///
/// These never reach the caller of a trace; the selector fails over on them
/// and the engine turns a final failure into a normal termination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Response decode failed: {0}")]
    Decode(String),
    #[error("Unexpected response shape: {0}")]
    Shape(String),
    #[error("Missing API credential for {provider}")]
    MissingCredential { provider: String },
    #[error("No provider configured for chain {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TraceError>;
