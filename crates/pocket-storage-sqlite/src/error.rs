//! Error types

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Image could not be decoded or encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the core crate (settings, config, passcode)
    #[error(transparent)]
    Core(#[from] pocket_core::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<Error> for pocket_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Core(inner) => inner,
            other => pocket_core::Error::Settings(other.to_string()),
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
