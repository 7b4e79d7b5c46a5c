use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-scoped application data. Opaque to the identity engine.
pub type SessionPayload = BTreeMap<String, serde_json::Value>;

/// Represents an authenticated, time-bounded access grant.
///
/// Issued only after a successful identification. A session is never
/// extended; it ends on expiry or explicit invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The random session token.
    pub session_id: String,
    /// The identified subject this session grants access for.
    pub subject_id: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
    /// Application data attached at creation.
    #[serde(default)]
    pub payload: SessionPayload,
}

impl Session {
    /// Whether the session is still live at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
