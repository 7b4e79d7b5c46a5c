use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;

use crate::crypto::token;
use crate::error::{AppError, Result};
use crate::models::session::{Session, SessionPayload};
use crate::repositories::sessions::SessionStore;

/// Issues, resolves and ends sessions.
///
/// A session is `Active` until its TTL elapses (`Expired`) or it is
/// invalidated (`Invalidated`). Both end states look the same to callers:
/// `get` returns `None`. Sessions are never extended.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    default_ttl: Duration,
}

impl SessionManager {
    /// Creates a new `SessionManager`.
    pub fn new(store: Arc<dyn SessionStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Creates a session for `subject_id` that expires after `ttl`.
    pub async fn create(&self, subject_id: &str, ttl: Duration, payload: SessionPayload) -> Result<Session> {
        if ttl.is_zero() {
            return Err(AppError::Validation("Session TTL must be positive".to_string()));
        }

        let lifetime = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::Validation(format!("Session TTL out of range: {}", e)))?;

        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::Validation("Session TTL out of range".to_string()))?;

        let session = Session {
            session_id: token::generate_session_id(),
            subject_id: subject_id.to_string(),
            created_at,
            expires_at,
            payload,
        };

        self.store.put(&session, ttl).await?;

        tracing::info!(
            "✅ Session {}… created for subject {} (ttl {}s)",
            token::redact(&session.session_id),
            subject_id,
            ttl.as_secs_f64()
        );
        Ok(session)
    }

    /// Creates a session with the configured TTL.
    pub async fn create_default(&self, subject_id: &str, payload: SessionPayload) -> Result<Session> {
        self.create(subject_id, self.default_ttl, payload).await
    }

    /// Resolves a live session.
    ///
    /// Unknown, expired and invalidated ids all return `None`; the expiring
    /// stores cannot tell them apart.
    pub async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let session = match self.store.get(session_id).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        if !session.is_active_at(Utc::now()) {
            tracing::debug!("⌛ Session {}… past expires_at", token::redact(session_id));
            self.store.remove(session_id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Ends a session early. Invalidating twice is not an error.
    pub async fn invalidate(&self, session_id: &str) -> Result<()> {
        self.store.remove(session_id).await?;
        tracing::info!("👋 Session {}… invalidated", token::redact(session_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::sessions::MemorySessionStore;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemorySessionStore::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn session_lives_until_ttl() {
        let manager = manager();
        let session = manager.create("user123", Duration::from_secs(1), Default::default()).await.unwrap();

        let found = manager.get(&session.session_id).await.unwrap().unwrap();
        assert_eq!(found.subject_id, "user123");
        assert_eq!(found.expires_at - found.created_at, chrono::Duration::seconds(1));

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(manager.get(&session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let manager = manager();
        let session = manager.create_default("user123", Default::default()).await.unwrap();

        manager.invalidate(&session.session_id).await.unwrap();
        manager.invalidate(&session.session_id).await.unwrap();
        assert!(manager.get(&session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_none() {
        assert!(manager().get("never-issued").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_get_distinct_ids() {
        let manager = manager();
        let a = manager.create_default("user123", Default::default()).await.unwrap();
        let b = manager.create_default("user123", Default::default()).await.unwrap();
        assert_ne!(a.session_id, b.session_id);
    }

    #[tokio::test]
    async fn payload_is_stored_verbatim() {
        let manager = manager();
        let mut payload = SessionPayload::new();
        payload.insert("cart".to_string(), serde_json::json!({"items": 2, "currency": "USD"}));

        let session = manager.create_default("user123", payload.clone()).await.unwrap();
        let found = manager.get(&session.session_id).await.unwrap().unwrap();
        assert_eq!(found.payload, payload);
    }

    #[tokio::test]
    async fn zero_ttl_is_rejected() {
        let result = manager().create("user123", Duration::ZERO, Default::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn oversized_ttl_is_rejected_without_storing() {
        let store = MemorySessionStore::new();
        let manager = SessionManager::new(Arc::new(store.clone()), Duration::from_secs(60));

        for ttl in [Duration::from_secs(9_000_000_000_000), Duration::MAX] {
            let result = manager.create("user123", ttl, Default::default()).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(store.is_empty().await);
    }
}
