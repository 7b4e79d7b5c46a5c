use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::template::Template;

/// Keyed storage of one sealed template per subject.
///
/// Writes are atomic per record and last-writer-wins. `list_all` returns a
/// snapshot that may already be stale under concurrent upserts.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Inserts the template, replacing any record for the same subject.
    async fn upsert(&self, template: Template) -> Result<()>;

    /// Loads the template for a subject. Fails with `NotFound` if absent.
    async fn get(&self, subject_id: &str) -> Result<Template>;

    /// Lists every stored template.
    async fn list_all(&self) -> Result<Vec<Template>>;

    /// Removes a subject's template. Returns whether a record existed.
    async fn delete(&self, subject_id: &str) -> Result<bool>;
}

/// An in-process `TemplateStore`. Records are still sealed.
#[derive(Clone, Default)]
pub struct MemoryTemplateStore {
    templates: Arc<RwLock<HashMap<String, Template>>>,
}

impl MemoryTemplateStore {
    /// Creates a new, empty `MemoryTemplateStore`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn upsert(&self, template: Template) -> Result<()> {
        let mut templates = self.templates.write().await;
        templates.insert(template.subject_id.clone(), template);
        Ok(())
    }

    async fn get(&self, subject_id: &str) -> Result<Template> {
        let templates = self.templates.read().await;
        templates.get(subject_id).cloned().ok_or(AppError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Template>> {
        let templates = self.templates.read().await;
        Ok(templates.values().cloned().collect())
    }

    async fn delete(&self, subject_id: &str) -> Result<bool> {
        let mut templates = self.templates.write().await;
        Ok(templates.remove(subject_id).is_some())
    }
}
