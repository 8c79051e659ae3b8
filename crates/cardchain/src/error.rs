//! Error types for the card manager.

use cardchain_core::{CardError, CardId};
use cardchain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during manager operations.
///
/// Bad input cards are not errors; they come back as
/// [`ImportResult::Rejected`](crate::ImportResult::Rejected).
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Card error outside of import (configuration, export).
    #[error("card error: {0}")]
    Card(#[from] CardError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Card not found.
    #[error("card not found: {0}")]
    CardNotFound(CardId),
}

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, ManagerError>;
