//! roster-client — self-registration with a Roster registry.
//!
//! A process embeds an [`ApplicationRegistrator`] and points it at the
//! registry's base URL. The registrator periodically announces the
//! process (name plus management/health/service URLs resolved by
//! [`ClientProperties`]) and keeps announcing it on a fixed delay, so a
//! registry restart or a transient network failure heals itself on the
//! next tick. On shutdown the embedding process calls
//! [`ApplicationRegistrator::deregister`] as a best effort; if that
//! fails, the registry's health polling will surface the absence as
//! OFFLINE instead.

pub mod error;
mod http_client;
pub mod identity;
pub mod registrator;

pub use error::ClientError;
pub use identity::{ClientConfig, ClientProperties};
pub use registrator::ApplicationRegistrator;
