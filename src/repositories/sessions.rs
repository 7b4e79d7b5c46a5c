use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::session::Session;

/// An expiring key-value store for sessions.
///
/// Expiry is the store's job: once `ttl` has elapsed, `get` must behave as if
/// the session never existed. No caller sweeps expired entries.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a session that evicts itself after `ttl`.
    async fn put(&self, session: &Session, ttl: Duration) -> Result<()>;

    /// Loads a live session. Expired and unknown ids both yield `None`.
    async fn get(&self, session_id: &str) -> Result<Option<Session>>;

    /// Removes a session. Removing an absent id is not an error.
    async fn remove(&self, session_id: &str) -> Result<()>;
}

struct Entry {
    session: Session,
    deadline: Instant,
}

/// An in-process `SessionStore` with per-entry deadlines.
///
/// Expired entries are dropped when read, and swept opportunistically on
/// every insert so the map stays bounded without a background task.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemorySessionStore {
    /// Creates a new, empty `MemorySessionStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, live or not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session: &Session, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        entries.retain(|_, entry| entry.deadline > now);
        entries.insert(
            session.session_id.clone(),
            Entry {
                session: session.clone(),
                deadline: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let mut entries = self.entries.lock().await;

        match entries.get(session_id) {
            Some(entry) if entry.deadline > Instant::now() => Ok(Some(entry.session.clone())),
            Some(_) => {
                entries.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.entries.lock().await.remove(session_id);
        Ok(())
    }
}
