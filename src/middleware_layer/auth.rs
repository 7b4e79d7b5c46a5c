use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{crypto::token, error::AppError, state::AppState};

/// The header clients may use instead of `Authorization: Bearer`.
pub const SESSION_HEADER: &str = "x-session-id";

/// Extracts the session token from the request headers.
///
/// # Arguments
///
/// * `headers` - The request headers.
///
/// # Returns
///
/// An `Option` containing the session ID if found.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let custom = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);

    bearer
        .or(custom)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// A middleware that requires a live session to be presented.
///
/// The resolved `Session` is inserted into the request extensions.
/// Unknown and expired sessions are rejected with 401; a session store
/// failure is reported as such rather than as a rejection.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking session...");

    let Some(session_id) = extract_session_token(request.headers()) else {
        tracing::warn!("❌ No session token presented");
        return AppError::Unauthorized.into_response();
    };

    let session = match state.sessions.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::warn!("❌ Invalid or expired session {}…", token::redact(&session_id));
            return AppError::Unauthorized.into_response();
        }
        Err(e) => return e.into_response(),
    };

    tracing::debug!("✅ Session valid for subject: {}", session.subject_id);

    request.extensions_mut().insert(session);

    next.run(request).await
}
