use std::time::Duration;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::{
    crypto::token,
    error::{AppError, Result},
    models::session::Session,
    repositories::sessions::SessionStore,
};

/// Formats the Redis key for a session id.
fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

/// A `SessionStore` that leans on Redis key expiry.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    /// Creates a new `RedisSessionStore` over a pooled connection manager.
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Opens a connection manager for `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self::new(redis))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, session: &Session, ttl: Duration) -> Result<()> {
        let session_json = sonic_rs::to_string(session)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        let mut redis = self.redis.clone();
        let _: () = redis
            .pset_ex(session_key(&session.session_id), &session_json, ttl_ms)
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis PSETEX failed: {}", e);
                AppError::Redis(e)
            })?;

        tracing::debug!(
            "✅ Session saved to Redis: session:{}…",
            token::redact(&session.session_id)
        );
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let mut redis = self.redis.clone();
        let session_json: Option<String> = redis.get(session_key(session_id)).await?;

        match session_json {
            Some(json) => {
                let session: Session = sonic_rs::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Invalid session JSON: {}", e))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(session_key(session_id)).await?;
        Ok(())
    }
}
