use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::{
    error::{AppError, Result},
    models::template::Template,
    repositories::templates::TemplateStore,
};

/// A helper function to map a `tokio_postgres::Row` to a `Template`.
fn row_to_template(row: &Row) -> Result<Template> {
    Ok(Template {
        subject_id: row.try_get("subject_id").map_err(|_| AppError::MissingData("subject_id".to_string()))?,
        encrypted_vector: row.try_get("encrypted_vector").map_err(|_| AppError::MissingData("encrypted_vector".to_string()))?,
        model_tag: row.try_get("model_tag").map_err(|_| AppError::MissingData("model_tag".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// A `TemplateStore` backed by the `templates` table.
#[derive(Clone)]
pub struct PgTemplateStore {
    pool: Pool,
}

impl PgTemplateStore {
    /// Creates a new `PgTemplateStore` over an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PgTemplateStore {
    async fn upsert(&self, template: Template) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                INSERT INTO templates (subject_id, encrypted_vector, model_tag, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (subject_id) DO UPDATE
                SET encrypted_vector = EXCLUDED.encrypted_vector,
                    model_tag = EXCLUDED.model_tag,
                    created_at = EXCLUDED.created_at
                "#,
                &[
                    &template.subject_id,
                    &template.encrypted_vector,
                    &template.model_tag,
                    &template.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, subject_id: &str) -> Result<Template> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT subject_id, encrypted_vector, model_tag, created_at
                FROM templates
                WHERE subject_id = $1
                "#,
                &[&subject_id],
            )
            .await?
            .ok_or(AppError::NotFound)?;
        row_to_template(&row)
    }

    async fn list_all(&self) -> Result<Vec<Template>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT subject_id, encrypted_vector, model_tag, created_at
                FROM templates
                ORDER BY created_at, subject_id
                "#,
                &[],
            )
            .await?;
        rows.iter().map(row_to_template).collect()
    }

    async fn delete(&self, subject_id: &str) -> Result<bool> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM templates WHERE subject_id = $1", &[&subject_id])
            .await?;
        Ok(deleted > 0)
    }
}
