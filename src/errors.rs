use thiserror::Error;

/// Error type shared by persistence, configuration, and import paths.
///
/// Ledger mutations themselves never fail; they report no-ops through outcome
/// values instead.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Stored ledger schema v{found} is newer than supported v{supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
    #[error("Import would overwrite existing data and was not confirmed")]
    ImportNotConfirmed,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
