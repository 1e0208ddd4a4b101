//! Error types for the registry store.

use thiserror::Error;

/// Errors that can occur when mutating the application directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record failed domain validation (e.g. missing health URL).
    #[error(transparent)]
    Invalid(#[from] roster_model::ModelError),
}
