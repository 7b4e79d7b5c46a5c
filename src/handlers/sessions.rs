use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    error::{AppError, Result},
    models::session::Session,
    state::AppState,
    validation::session::validate_session_id,
};

/// Looks up a session by id. Expired and unknown ids are both 404.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse> {
    validate_session_id(&session_id)?;

    let session = state
        .sessions
        .get(&session_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session))
}

/// Invalidates a session by id. Repeating the call is harmless.
pub async fn invalidate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse> {
    validate_session_id(&session_id)?;

    state.sessions.invalidate(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the session presented with the request.
pub async fn current_session(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(session)
}

/// Ends the session presented with the request.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    state.sessions.invalidate(&session.session_id).await?;
    tracing::info!("✅ Subject logged out: {}", session.subject_id);
    Ok(StatusCode::NO_CONTENT)
}
