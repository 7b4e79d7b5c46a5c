use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use garde::Validate;
use serde::Deserialize;

use crate::{
    error::Result,
    state::AppState,
    validation::biometric::{
        model_tag_rule, subject_id_rule, validate_subject_id, vector_rule, VectorLimits,
    },
};

/// The request payload for enrolling a subject.
#[derive(Deserialize, Debug, Validate)]
#[garde(context(VectorLimits))]
pub struct EnrollRequest {
    #[garde(custom(subject_id_rule))]
    pub subject_id: String,
    #[garde(custom(vector_rule))]
    pub vector: Vec<f32>,
    #[garde(custom(model_tag_rule))]
    pub model_tag: Option<String>,
}

/// Handles enrollment. Re-enrolling a subject replaces its template.
pub async fn enroll(
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse> {
    payload.validate_with(&state.vector_limits())?;

    let model_tag = payload
        .model_tag
        .as_deref()
        .unwrap_or(&state.config.default_model_tag);

    let info = state
        .matcher
        .enroll(&payload.subject_id, &payload.vector, model_tag)
        .await?;

    Ok((StatusCode::CREATED, Json(info)))
}

/// Returns a template's metadata. The sealed vector is never exposed.
pub async fn get_template(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<impl IntoResponse> {
    validate_subject_id(&subject_id)?;
    let info = state.matcher.template_info(&subject_id).await?;
    Ok(Json(info))
}

/// Deletes a subject's template.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<impl IntoResponse> {
    validate_subject_id(&subject_id)?;
    state.matcher.remove(&subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
