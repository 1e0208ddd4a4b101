//! roster-registry — the server side of the Roster service registry.
//!
//! Holds the authoritative directory of registered applications and
//! keeps their health status fresh:
//!
//! ```text
//! ApplicationStore (in-memory, whole-record replace)
//!   ├── StatusUpdater — one periodic tick, probes stale entries
//!   │     └── query_status() fallback ladder:
//!   │           explicit "status" field > HTTP 2xx (UP) > non-2xx (DOWN)
//!   │           transport failure → OFFLINE
//!   └── EventHub — synchronous, in-process change notifications
//! ```
//!
//! The store is an explicit, cheaply-cloneable handle; there is no
//! ambient global state. Entries are only ever replaced wholesale, so a
//! concurrent reader never observes a half-updated application.

pub mod error;
pub mod events;
pub mod probe;
pub mod store;
pub mod updater;

pub use error::StoreError;
pub use events::{EventHub, RegistryEvent};
pub use store::ApplicationStore;
pub use updater::StatusUpdater;
