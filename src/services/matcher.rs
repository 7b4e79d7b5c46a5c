use std::sync::Arc;
use chrono::Utc;

use crate::crypto::{key::DeploymentKey, vector};
use crate::error::{AppError, Result};
use crate::models::template::{Template, TemplateInfo};
use crate::repositories::templates::TemplateStore;
use crate::services::similarity;

/// The result of an identification scan.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyOutcome {
    /// The best-scoring subject cleared the threshold.
    Matched { subject_id: String, score: f64 },
    /// No template cleared the threshold, or none were enrolled.
    NoMatch,
}

/// Enrolls and identifies subjects against sealed templates.
///
/// Identification is a linear scan over every template. Each call keeps its
/// own running best, so concurrent scans never share state. An approximate
/// nearest-neighbour index would slot in behind `TemplateStore` if the
/// population outgrows a scan.
#[derive(Clone)]
pub struct IdentityMatcher {
    store: Arc<dyn TemplateStore>,
    key: Arc<DeploymentKey>,
    threshold: f64,
}

impl IdentityMatcher {
    /// Creates a new `IdentityMatcher`.
    pub fn new(store: Arc<dyn TemplateStore>, key: Arc<DeploymentKey>, threshold: f64) -> Self {
        Self { store, key, threshold }
    }

    /// Seals `vector` and stores it as the subject's only template.
    pub async fn enroll(&self, subject_id: &str, vector: &[f32], model_tag: &str) -> Result<TemplateInfo> {
        similarity::ensure_scorable(vector)?;

        let encrypted_vector = vector::encrypt(vector, &self.key)?;
        let template = Template {
            subject_id: subject_id.to_string(),
            encrypted_vector,
            model_tag: model_tag.to_string(),
            created_at: Utc::now(),
        };
        let info = TemplateInfo::from(&template);

        self.store.upsert(template).await?;

        tracing::info!(
            "✅ Enrolled subject {} ({} dims, model {})",
            subject_id,
            vector.len(),
            model_tag
        );
        Ok(info)
    }

    /// Finds the enrolled subject closest to `probe`.
    ///
    /// When `model_tag` is given, templates from other models are not scored.
    /// Templates that fail to open or have a different dimension are skipped;
    /// only a store failure fails the call. Among exact ties the first template
    /// in enumeration order wins.
    pub async fn identify(&self, probe: &[f32], model_tag: Option<&str>) -> Result<IdentifyOutcome> {
        similarity::ensure_scorable(probe)?;

        let templates = self.store.list_all().await?;
        let mut best: Option<(String, f64)> = None;
        let mut skipped = 0usize;

        for template in &templates {
            if model_tag.is_some_and(|tag| template.model_tag != tag) {
                continue;
            }

            let stored = match vector::decrypt(&template.encrypted_vector, &self.key) {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!("⚠️  Skipping template for {}: {}", template.subject_id, e);
                    skipped += 1;
                    continue;
                }
            };

            let score = match similarity::score(&stored, probe) {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!("⚠️  Skipping template for {}: {}", template.subject_id, e);
                    skipped += 1;
                    continue;
                }
            };

            if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
                best = Some((template.subject_id.clone(), score));
            }
        }

        tracing::debug!(
            "🔍 Scanned {} templates ({} skipped)",
            templates.len(),
            skipped
        );

        match best {
            Some((subject_id, score)) if similarity::accept(score, self.threshold) => {
                tracing::info!("✅ Identified subject {} (score {:.4})", subject_id, score);
                Ok(IdentifyOutcome::Matched { subject_id, score })
            }
            Some((_, score)) => {
                tracing::info!("❌ No match: best score {:.4} <= {}", score, self.threshold);
                Ok(IdentifyOutcome::NoMatch)
            }
            None => {
                tracing::info!("❌ No match: no comparable templates");
                Ok(IdentifyOutcome::NoMatch)
            }
        }
    }

    /// Returns the metadata of a subject's template.
    pub async fn template_info(&self, subject_id: &str) -> Result<TemplateInfo> {
        let template = self.store.get(subject_id).await?;
        Ok(TemplateInfo::from(&template))
    }

    /// Removes a subject's template. Fails with `NotFound` if none exists.
    pub async fn remove(&self, subject_id: &str) -> Result<()> {
        if !self.store.delete(subject_id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!("🗑️  Removed template for subject {}", subject_id);
        Ok(())
    }
}
