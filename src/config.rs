use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::key::{self, KEY_SIZE};

/// Acceptance threshold used when `SIMILARITY_THRESHOLD` is unset.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
/// Session lifetime used when `SESSION_TTL_SECONDS` is unset.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60;
/// Longest session lifetime a deployment may configure.
pub const MAX_SESSION_TTL_SECONDS: u64 = 86_400;
/// Model tag recorded when an enrollment does not name one.
pub const DEFAULT_MODEL_TAG: &str = "Facenet";
/// Largest vector length accepted by default.
pub const DEFAULT_MAX_VECTOR_DIMENSION: usize = 4096;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the PostgreSQL database. Templates stay in memory when unset.
    pub database_url: Option<String>,
    /// The URL of the Redis server. Sessions stay in memory when unset.
    pub redis_url: Option<String>,
    /// Scores must be strictly greater than this to identify a subject.
    pub similarity_threshold: f64,
    /// Lifetime of a session in seconds.
    pub session_ttl_seconds: u64,
    /// Model tag used when an enrollment omits one.
    pub default_model_tag: String,
    /// Largest accepted vector length.
    pub max_vector_dimension: usize,
    /// The deployment key used to encrypt templates.
    pub encryption_key: Zeroizing<Vec<u8>>,
    /// Whether `encryption_key` was generated at startup rather than supplied.
    pub key_generated: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a new `Config` from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (encryption_key, key_generated) = match lookup("ENCRYPTION_KEY") {
            Some(mut key_hex) => {
                let decoded = hex::decode(key_hex.trim())
                    .context("ENCRYPTION_KEY must be valid hexadecimal");
                key_hex.zeroize();
                let key_bytes = Zeroizing::new(decoded?);

                if key_bytes.len() != KEY_SIZE {
                    anyhow::bail!("ENCRYPTION_KEY must be exactly 32 bytes (64 hex characters)");
                }
                (key_bytes, false)
            }
            None => {
                let generated = key::generate_key();
                (Zeroizing::new(generated.as_bytes().to_vec()), true)
            }
        };

        let similarity_threshold: f64 = lookup("SIMILARITY_THRESHOLD")
            .unwrap_or_else(|| DEFAULT_SIMILARITY_THRESHOLD.to_string())
            .parse()
            .context("Invalid SIMILARITY_THRESHOLD")?;

        if !similarity_threshold.is_finite() || !(-1.0..1.0).contains(&similarity_threshold) {
            anyhow::bail!("SIMILARITY_THRESHOLD must be within [-1, 1)");
        }

        let session_ttl_seconds: u64 = lookup("SESSION_TTL_SECONDS")
            .unwrap_or_else(|| DEFAULT_SESSION_TTL_SECONDS.to_string())
            .parse()
            .context("Invalid SESSION_TTL_SECONDS")?;

        if session_ttl_seconds == 0 || session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
            anyhow::bail!(
                "SESSION_TTL_SECONDS must be between 1 and {}",
                MAX_SESSION_TTL_SECONDS
            );
        }

        let max_vector_dimension: usize = lookup("MAX_VECTOR_DIMENSION")
            .unwrap_or_else(|| DEFAULT_MAX_VECTOR_DIMENSION.to_string())
            .parse()
            .context("Invalid MAX_VECTOR_DIMENSION")?;

        if max_vector_dimension == 0 {
            anyhow::bail!("MAX_VECTOR_DIMENSION must be greater than zero");
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            similarity_threshold,
            session_ttl_seconds,
            default_model_tag: lookup("DEFAULT_MODEL_TAG")
                .filter(|tag| !tag.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL_TAG.to_string()),
            max_vector_dimension,
            encryption_key,
            key_generated,
        })
    }

    /// The session lifetime as a `Duration`.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}
