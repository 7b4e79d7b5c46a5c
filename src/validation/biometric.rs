use crate::error::{AppError, Result};

/// The longest accepted subject id.
pub const MAX_SUBJECT_ID_LEN: usize = 128;
/// The longest accepted model tag.
pub const MAX_MODEL_TAG_LEN: usize = 64;

/// Request-time limits passed to `garde` as validation context.
#[derive(Debug, Clone, Copy)]
pub struct VectorLimits {
    pub max_dimension: usize,
}

fn check_subject_id(subject_id: &str) -> std::result::Result<(), String> {
    if subject_id.is_empty() {
        return Err("Subject id cannot be empty".to_string());
    }

    if subject_id.len() > MAX_SUBJECT_ID_LEN {
        return Err(format!("Subject id must be at most {} characters", MAX_SUBJECT_ID_LEN));
    }

    if !subject_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '@'))
    {
        return Err(
            "Subject id can only contain letters, numbers, and _ - . : @".to_string(),
        );
    }

    Ok(())
}

fn check_model_tag(model_tag: &str) -> std::result::Result<(), String> {
    if model_tag.trim().is_empty() {
        return Err("Model tag cannot be empty".to_string());
    }

    if model_tag.len() > MAX_MODEL_TAG_LEN {
        return Err(format!("Model tag must be at most {} characters", MAX_MODEL_TAG_LEN));
    }

    Ok(())
}

/// `garde` rule for subject ids.
#[allow(clippy::ptr_arg)]
pub fn subject_id_rule(value: &String, _limits: &VectorLimits) -> garde::Result {
    check_subject_id(value).map_err(garde::Error::new)
}

/// `garde` rule for optional model tags.
pub fn model_tag_rule(value: &Option<String>, _limits: &VectorLimits) -> garde::Result {
    match value {
        Some(tag) => check_model_tag(tag).map_err(garde::Error::new),
        None => Ok(()),
    }
}

/// `garde` rule for embeddings: non-empty, bounded, finite components.
#[allow(clippy::ptr_arg)]
pub fn vector_rule(value: &Vec<f32>, limits: &VectorLimits) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("Vector cannot be empty"));
    }

    if value.len() > limits.max_dimension {
        return Err(garde::Error::new(format!(
            "Vector must have at most {} components",
            limits.max_dimension
        )));
    }

    if value.iter().any(|c| !c.is_finite()) {
        return Err(garde::Error::new("Vector components must be finite"));
    }

    Ok(())
}

/// Validates a subject id taken from a path segment.
pub fn validate_subject_id(subject_id: &str) -> Result<()> {
    check_subject_id(subject_id).map_err(AppError::Validation)
}
