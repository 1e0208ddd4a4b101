//! Registration endpoint handlers.
//!
//! Each handler reads/writes the [`ApplicationStore`] and publishes
//! registry events for the listeners (route locator among them).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use roster_model::Application;
use roster_registry::RegistryEvent;

use crate::ApiState;

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "error": msg })))
}

/// POST /api/applications
///
/// Upserts by health URL; responds 201 with the stored record (id
/// included) so the client can cache the id for deregistration.
pub async fn register_application(
    State(state): State<ApiState>,
    Json(payload): Json<Application>,
) -> impl IntoResponse {
    match state.store.save(payload) {
        Ok(stored) => {
            info!(
                id = stored.id().unwrap_or(""),
                name = stored.name(),
                health_url = stored.health_url(),
                "application registered"
            );
            state.hub.publish(&RegistryEvent::Registered(stored.clone()));
            (StatusCode::CREATED, Json(stored)).into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response(),
    }
}

/// GET /api/applications
pub async fn list_applications(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.store.find_all())
}

/// GET /api/applications/{id}
pub async fn get_application(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.find(&id) {
        Some(app) => Json(app).into_response(),
        None => error_response("application not found", StatusCode::NOT_FOUND).into_response(),
    }
}

/// DELETE /api/applications/{id}
pub async fn deregister_application(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete(&id) {
        Some(removed) => {
            info!(%id, name = removed.name(), "application deregistered");
            state
                .hub
                .publish(&RegistryEvent::Deregistered(removed.clone()));
            Json(removed).into_response()
        }
        None => error_response("application not found", StatusCode::NOT_FOUND).into_response(),
    }
}

/// GET /api/routes
pub async fn get_routes(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.locator.routes().as_ref().clone())
}
