//! Router construction.

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use mediq_auth::http::{
    change_password_handler, delete_account_handler, get_profile_handler, login_handler,
    logout_handler, register_handler, update_profile_handler, verify_doctor_handler,
};

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(healthz_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route(
            "/auth/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/auth/change-password", put(change_password_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/account", delete(delete_account_handler))
        .route("/auth/verify-doctor/{doctor_id}", put(verify_doctor_handler))
        .layer(TraceLayer::new_for_http())
        // The browser frontend is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for `GET /`.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "MediQ Auth Service",
        "status": "ok",
    }))
}

/// Handler for `GET /healthz`.
async fn healthz_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
