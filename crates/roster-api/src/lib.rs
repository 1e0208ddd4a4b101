//! roster-api — REST surface of the Roster registry.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/applications` | Register (or refresh) an application |
//! | GET | `/api/applications` | List all registered applications |
//! | GET | `/api/applications/{id}` | Get one application |
//! | DELETE | `/api/applications/{id}` | Deregister an application |
//! | GET | `/api/routes` | Current proxy route table |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use roster_proxy::RouteLocator;
use roster_registry::{ApplicationStore, EventHub};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: ApplicationStore,
    pub hub: EventHub,
    pub locator: Arc<RouteLocator>,
}

/// Build the registry API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/applications",
            get(handlers::list_applications).post(handlers::register_application),
        )
        .route(
            "/api/applications/{id}",
            get(handlers::get_application).delete(handlers::deregister_application),
        )
        .route("/api/routes", get(handlers::get_routes))
        .with_state(state)
}
