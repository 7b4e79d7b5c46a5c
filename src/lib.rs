//! Face-template identification and session issuance.
//!
//! Subjects are enrolled with a feature vector that is sealed with
//! AES-256-GCM before it reaches a [`repositories::templates::TemplateStore`].
//! Identification opens and scores every template against a probe with cosine
//! similarity and, above the configured threshold, the binary's HTTP surface
//! issues a short-lived session through [`services::sessions::SessionManager`].

pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod routes;

pub mod crypto {
    pub mod aes;
    pub mod key;
    pub mod token;
    pub mod vector;
}

pub mod models {
    pub mod session;
    pub mod template;
}

pub mod repositories {
    pub mod templates;
    pub mod pg_templates;
    pub mod sessions;
    pub mod redis_sessions;
}

pub mod services {
    pub mod similarity;
    pub mod matcher;
    pub mod sessions;
}

pub mod handlers {
    pub mod templates;
    pub mod identify;
    pub mod sessions;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod biometric;
    pub mod session;
}
