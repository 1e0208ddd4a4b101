//! roster-model — domain types for the Roster service registry.
//!
//! An [`Application`] is an immutable description of one registered
//! client: its name, the three URLs it advertises, and the last known
//! [`StatusInfo`]. Values are never mutated in place; every change goes
//! through [`Application::rebuild`] and produces a fresh value, so the
//! registry can replace whole records and readers never see a partial
//! update.

pub mod application;
pub mod error;
pub mod status;

pub use application::{Application, ApplicationBuilder};
pub use error::ModelError;
pub use status::StatusInfo;
