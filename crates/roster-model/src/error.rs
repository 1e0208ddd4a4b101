//! Validation errors for the domain model.

use thiserror::Error;

/// Errors raised when building an [`crate::Application`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("health url must not be empty")]
    MissingHealthUrl,

    #[error("name must not be empty")]
    MissingName,
}
