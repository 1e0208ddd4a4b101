//! Client-side error types.

use thiserror::Error;

/// Errors from resolving this process's identity or building the
/// registration payload.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The embedding server has not bound its listener yet, so no
    /// service URL can be derived.
    #[error("server not initialized yet, service url unresolved")]
    ServerNotInitialized,

    /// `prefer_ip` is set but no address was configured.
    #[error("ip address must be configured when prefer_ip is set")]
    MissingAddress,

    #[error(transparent)]
    Invalid(#[from] roster_model::ModelError),
}
