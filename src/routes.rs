use axum::{
    Router,
    routing::{get, post},
    middleware::from_fn_with_state,
};

use crate::{handlers, middleware_layer, state::AppState};

async fn health() -> &'static str {
    "ok"
}

/// Builds the application's routes.
///
/// Transport concerns (CORS, tracing, rate limiting, body limits) are
/// layered on by the binary.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/templates", post(handlers::templates::enroll))
        .route(
            "/api/templates/{subject_id}",
            get(handlers::templates::get_template).delete(handlers::templates::delete_template),
        )
        .route("/api/identify", post(handlers::identify::identify))
        .route("/api/sessions", post(handlers::identify::create_session))
        .route(
            "/api/sessions/{session_id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::invalidate_session),
        )
        .with_state(state.clone());

    let session_routes = Router::new()
        .route(
            "/api/session",
            get(handlers::sessions::current_session).delete(handlers::sessions::logout),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(session_routes)
}
