//! Unified error types for `PharmaList`.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer maps
//! these variants onto status codes in [`crate::api::error`].

use thiserror::Error;

/// Errors produced by configuration, storage, and the curation workflow
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A required field was missing, blank, or malformed
    #[error("{message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// No valid name exists with the given id
    #[error("Valid name not found: {id}")]
    ValidNameNotFound {
        /// Requested id
        id: i64,
    },

    /// No category exists with the given id
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// Requested id
        id: i64,
    },

    /// No raw medicine record matches the given name
    #[error("Medicine not found in raw medicines: {name}")]
    RawMedicineNotFound {
        /// Requested raw name
        name: String,
    },

    /// A valid name with the same case-insensitive name already exists
    #[error("Name already exists: {name}")]
    DuplicateName {
        /// Conflicting name
        name: String,
    },

    /// A category with the same case-insensitive name already exists
    #[error("Category already exists: {name}")]
    DuplicateCategory {
        /// Conflicting name
        name: String,
    },

    /// The raw record was already promoted
    #[error("Medicine already validated: {name}")]
    AlreadyValidated {
        /// Raw name that was promoted earlier
        name: String,
    },

    /// The image backend rejected or failed an operation
    #[error("Image storage error: {message}")]
    ImageStorage {
        /// Backend-specific description
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Outbound HTTP error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
