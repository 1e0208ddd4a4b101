//! roster-proxy — route table derivation for the reverse-proxy layer.
//!
//! The actual request forwarding (header rewriting, streaming, error
//! translation) lives in the proxy transport; this crate only produces
//! what it consumes: a mapping from path prefix to target base URL,
//! recomputed from the registry whenever it changes.
//!
//! ```text
//! RouteLocator
//!   ├── refresh() — store snapshot → complete RouteTable → pointer swap
//!   └── listener() — event-hub callback, refreshes on any registry event
//! ```
//!
//! A consumer always sees one coherent table: recomputation builds the
//! replacement in full and publishes it with a single swap, never by
//! editing entries in place.

pub mod locator;
pub mod routes;

pub use locator::RouteLocator;
pub use routes::{ProxyRoute, RouteTable};
