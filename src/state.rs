use std::sync::Arc;
use crate::config::Config;
use crate::crypto::key::DeploymentKey;
use crate::error::Result;
use crate::repositories::{
    pg_templates::PgTemplateStore,
    redis_sessions::RedisSessionStore,
    sessions::{MemorySessionStore, SessionStore},
    templates::{MemoryTemplateStore, TemplateStore},
};
use crate::services::{matcher::IdentityMatcher, sessions::SessionManager};
use crate::validation::biometric::VectorLimits;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Enrollment and identification over sealed templates.
    pub matcher: IdentityMatcher,
    /// Session issuance and lookup.
    pub sessions: SessionManager,
}

impl AppState {
    /// Creates a new `AppState`, connecting to Postgres and Redis when configured.
    pub async fn new(config: &Config) -> Result<Self> {
        let key = Arc::new(DeploymentKey::from_slice(&config.encryption_key)?);

        if config.key_generated {
            tracing::warn!(
                "⚠️  ENCRYPTION_KEY not set: generated an ephemeral deployment key. \
                 Templates sealed by this process cannot be opened after a restart."
            );
        }

        let templates: Arc<dyn TemplateStore> = match &config.database_url {
            Some(database_url) => {
                let pool = crate::db::create_pool(database_url)?;
                crate::db::run_migrations(&pool).await?;
                crate::db::ensure_deployment_key(&pool, &key).await?;
                tracing::info!("✅ PostgreSQL template store initialized");
                Arc::new(PgTemplateStore::new(pool))
            }
            None => {
                tracing::warn!("⚠️  DATABASE_URL not set: templates are kept in memory");
                Arc::new(MemoryTemplateStore::new())
            }
        };

        let sessions: Arc<dyn SessionStore> = match &config.redis_url {
            Some(redis_url) => {
                let store = RedisSessionStore::connect(redis_url).await?;
                tracing::info!("✅ Redis session store initialized (pooled)");
                Arc::new(store)
            }
            None => {
                tracing::warn!("⚠️  REDIS_URL not set: sessions are kept in memory");
                Arc::new(MemorySessionStore::new())
            }
        };

        Self::with_stores(config, key, templates, sessions)
    }

    /// Creates an `AppState` over in-memory stores.
    pub fn in_memory(config: &Config) -> Result<Self> {
        let key = Arc::new(DeploymentKey::from_slice(&config.encryption_key)?);
        Self::with_stores(
            config,
            key,
            Arc::new(MemoryTemplateStore::new()),
            Arc::new(MemorySessionStore::new()),
        )
    }

    /// Creates an `AppState` over explicit stores.
    pub fn with_stores(
        config: &Config,
        key: Arc<DeploymentKey>,
        templates: Arc<dyn TemplateStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        Ok(AppState {
            config: config.clone(),
            matcher: IdentityMatcher::new(templates, key, config.similarity_threshold),
            sessions: SessionManager::new(sessions, config.session_ttl()),
        })
    }

    /// Validation limits derived from the configuration.
    pub fn vector_limits(&self) -> VectorLimits {
        VectorLimits {
            max_dimension: self.config.max_vector_dimension,
        }
    }
}
