use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A facial feature vector as produced by the external extractor.
pub type Embedding = Vec<f32>;

/// Represents one enrolled subject.
///
/// Records are replaced wholesale on re-enrollment and never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// The unique identifier of the enrolled subject.
    pub subject_id: String,
    /// The sealed embedding (`ciphertext || tag || nonce`) under the deployment key.
    pub encrypted_vector: Vec<u8>,
    /// The extraction model that produced the embedding.
    pub model_tag: String,
    /// The timestamp when the template was created.
    pub created_at: DateTime<Utc>,
}

/// The public view of a template. Never carries the sealed vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub subject_id: String,
    pub model_tag: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Template> for TemplateInfo {
    fn from(template: &Template) -> Self {
        Self {
            subject_id: template.subject_id.clone(),
            model_tag: template.model_tag.clone(),
            created_at: template.created_at,
        }
    }
}
