//! Failures reported by the boleto store.
//!
//! Every variant is returned straight to the caller; the store never retries.

use boleto_core::BoletoStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A submitted form failed one or more required-field rules.
    #[error("invalid boleto: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("boleto not found: {0}")]
    NotFound(String),

    /// The persisted collection could not be read back.
    #[error("stored collection is malformed: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("failed to serialize collection: {0}")]
    Serialization(serde_json::Error),

    #[error("transition from {from} to {to} is not allowed")]
    InvalidTransition { from: BoletoStatus, to: BoletoStatus },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
