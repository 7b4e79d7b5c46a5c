use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::session::SessionPayload,
    services::matcher::IdentifyOutcome,
    state::AppState,
    validation::biometric::{model_tag_rule, vector_rule, VectorLimits},
};

/// The request payload for identifying a probe vector.
#[derive(Deserialize, Debug, Validate)]
#[garde(context(VectorLimits))]
pub struct IdentifyRequest {
    #[garde(custom(vector_rule))]
    pub vector: Vec<f32>,
    #[garde(custom(model_tag_rule))]
    pub model_tag: Option<String>,
}

/// The request payload for opening a session by identification.
#[derive(Deserialize, Debug, Validate)]
#[garde(context(VectorLimits))]
pub struct CreateSessionRequest {
    #[garde(custom(vector_rule))]
    pub vector: Vec<f32>,
    #[garde(custom(model_tag_rule))]
    pub model_tag: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub payload: SessionPayload,
}

/// The response payload for a successful identification.
#[derive(Serialize, Deserialize, Debug)]
pub struct IdentifyResponse {
    pub matched: bool,
    pub subject_id: String,
    pub score: f64,
}

/// The response payload for a newly issued session.
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub subject_id: String,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct NoMatchResponse {
    matched: bool,
    error: &'static str,
}

/// A failed identification is a normal outcome, answered with 401.
fn no_match() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(NoMatchResponse {
            matched: false,
            error: "No matching subject",
        }),
    )
        .into_response()
}

/// Handles identification without issuing a session.
pub async fn identify(
    State(state): State<AppState>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<Response> {
    payload.validate_with(&state.vector_limits())?;

    match state
        .matcher
        .identify(&payload.vector, payload.model_tag.as_deref())
        .await?
    {
        IdentifyOutcome::Matched { subject_id, score } => Ok((
            StatusCode::OK,
            Json(IdentifyResponse {
                matched: true,
                subject_id,
                score,
            }),
        )
            .into_response()),
        IdentifyOutcome::NoMatch => Ok(no_match()),
    }
}

/// Identifies the probe and, only on a match, issues a session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Response> {
    payload.validate_with(&state.vector_limits())?;

    let (subject_id, score) = match state
        .matcher
        .identify(&payload.vector, payload.model_tag.as_deref())
        .await?
    {
        IdentifyOutcome::Matched { subject_id, score } => (subject_id, score),
        IdentifyOutcome::NoMatch => return Ok(no_match()),
    };

    let session = state
        .sessions
        .create_default(&subject_id, payload.payload)
        .await?;

    let response = SessionCreatedResponse {
        session_id: session.session_id,
        subject_id,
        score,
        created_at: session.created_at,
        expires_at: session.expires_at,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}
