//! Error types for Secret Pocket core

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings backend could not read or write a value
    #[error("Settings error: {0}")]
    Settings(String),

    /// Configuration file is missing fields or holds invalid values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Passcode hashing or verification failed
    #[error("Passcode error: {0}")]
    Passcode(String),

    /// Biometric gate reported an error
    #[error("Biometric error: {0}")]
    Biometric(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the user can retry the failed action without restarting the app
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Passcode(_) | Error::Biometric(_) | Error::Validation(_)
        )
    }
}
