//! Error types for the orderwiz-core library.

use thiserror::Error;

/// Main error type for the orderwiz library.
#[derive(Error, Debug)]
pub enum OrderError {
    /// A field failed validation before anything was written.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No order exists with the given id.
    #[error("order {0} not found")]
    NotFound(i64),

    /// Storage (database or file) error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// OCR or field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl OrderError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for OrderError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Sqlite(err))
    }
}

impl From<std::io::Error> for OrderError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(StorageError::Io(err))
    }
}

/// Errors related to durable storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite failure (disk full, permission, corruption, ...).
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Image file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database file does not have the expected structure.
    #[error("unexpected schema: {0}")]
    Schema(String),
}

/// Errors related to OCR.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The OCR engine could not be loaded or started.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine ran but failed to recognize the image.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The bytes are not a supported image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the orderwiz library.
pub type Result<T> = std::result::Result<T, OrderError>;
