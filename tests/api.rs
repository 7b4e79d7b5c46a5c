use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use facegate::config::Config;
use facegate::routes::build_router;
use facegate::state::AppState;

// Shared test context
struct TestContext {
    app: Router,
}

impl TestContext {
    fn new() -> Self {
        Self::with_vars(&[])
    }

    fn with_vars(pairs: &[(&str, &str)]) -> Self {
        let vars: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_lookup(|name| {
            vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })
        .unwrap();
        let state = AppState::in_memory(&config).unwrap();
        Self { app: build_router(state) }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = session {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::DELETE).uri(uri);
        if let Some(token) = session {
            builder = builder.header("x-session-id", token);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn enroll(&self, subject_id: &str, vector: &[f32]) {
        let (status, _) = self
            .post(
                "/api/templates",
                json!({ "subject_id": subject_id, "vector": vector }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "enroll {} failed", subject_id);
    }
}

#[tokio::test]
async fn health_check() {
    let context = TestContext::new();
    let response = context
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn enroll_returns_metadata_without_ciphertext() {
    let context = TestContext::new();

    let (status, body) = context
        .post(
            "/api/templates",
            json!({ "subject_id": "user123", "vector": [0.1, 0.2, 0.3], "model_tag": "ArcFace" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subject_id"], "user123");
    assert_eq!(body["model_tag"], "ArcFace");
    assert!(body.get("encrypted_vector").is_none());

    let (status, body) = context.get("/api/templates/user123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_tag"], "ArcFace");
    assert!(body.get("encrypted_vector").is_none());
}

#[tokio::test]
async fn enroll_defaults_model_tag() {
    let context = TestContext::new();
    let (_, body) = context
        .post("/api/templates", json!({ "subject_id": "user123", "vector": [1.0, 2.0] }))
        .await;
    assert_eq!(body["model_tag"], "Facenet");
}

#[tokio::test]
async fn enroll_rejects_invalid_input() {
    let context = TestContext::with_vars(&[("MAX_VECTOR_DIMENSION", "4")]);

    let (status, _) = context
        .post("/api/templates", json!({ "subject_id": "bad id", "vector": [1.0] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = context
        .post("/api/templates", json!({ "subject_id": "user123", "vector": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = context
        .post(
            "/api/templates",
            json!({ "subject_id": "user123", "vector": [1.0, 1.0, 1.0, 1.0, 1.0] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = context
        .post("/api/templates", json!({ "subject_id": "user123", "vector": [0.0, 0.0] }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let context = TestContext::new();
    let (status, body) = context.get("/api/templates/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Resource not found");

    let (status, _) = context.delete("/api/templates/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn identify_on_empty_store_is_no_match() {
    let context = TestContext::new();
    let (status, body) = context
        .post("/api/identify", json!({ "vector": [0.3, 0.4, 0.5] }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["matched"], false);
}

#[tokio::test]
async fn identify_picks_exact_subject() {
    let context = TestContext::new();
    context.enroll("A", &[1.0, 0.0, 0.0]).await;
    context.enroll("B", &[0.0, 1.0, 0.2]).await;

    let (status, body) = context
        .post("/api/identify", json!({ "vector": [0.0, 1.0, 0.2] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], true);
    assert_eq!(body["subject_id"], "B");
    assert_eq!(body["score"], 1.0);
}

#[tokio::test]
async fn session_flow_from_identification_to_logout() {
    let context = TestContext::new();
    context.enroll("user123", &[0.2, 0.7, 0.1, 0.4]).await;

    let (status, created) = context
        .post(
            "/api/sessions",
            json!({
                "vector": [0.2, 0.7, 0.1, 0.4],
                "payload": { "cart": { "items": 3 } }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["subject_id"], "user123");
    let session_id = created["session_id"].as_str().unwrap().to_string();

    let (status, session) = context
        .get(&format!("/api/sessions/{}", session_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["subject_id"], "user123");
    assert_eq!(session["payload"]["cart"]["items"], 3);

    let (status, current) = context.get("/api/session", Some(&session_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["session_id"], session_id.as_str());

    let (status, _) = context.delete("/api/session", Some(&session_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = context.get("/api/session", Some(&session_id)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = context
        .get(&format!("/api/sessions/{}", session_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_identification_creates_no_session() {
    let context = TestContext::new();
    context.enroll("user123", &[1.0, 0.0]).await;

    let (status, body) = context
        .post("/api/sessions", json!({ "vector": [0.0, 1.0] }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("session_id").is_none());
}

#[tokio::test]
async fn invalidating_twice_is_harmless() {
    let context = TestContext::new();
    context.enroll("user123", &[1.0, 1.0]).await;
    let (_, created) = context
        .post("/api/sessions", json!({ "vector": [1.0, 1.0] }))
        .await;
    let uri = format!("/api/sessions/{}", created["session_id"].as_str().unwrap());

    let (first, _) = context.delete(&uri, None).await;
    let (second, _) = context.delete(&uri, None).await;
    assert_eq!(first, StatusCode::NO_CONTENT);
    assert_eq!(second, StatusCode::NO_CONTENT);

    let (status, _) = context.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_expires_after_ttl() {
    let context = TestContext::with_vars(&[("SESSION_TTL_SECONDS", "1")]);
    context.enroll("user123", &[0.5, 0.5, 0.5]).await;

    let (status, created) = context
        .post("/api/sessions", json!({ "vector": [0.5, 0.5, 0.5] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/sessions/{}", created["session_id"].as_str().unwrap());

    let (status, _) = context.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let (status, _) = context.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_route_requires_session() {
    let context = TestContext::new();
    let (status, body) = context.get("/api/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired session");

    let (status, _) = context.get("/api/session", Some("forged-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn re_enroll_moves_identity_to_new_vector() {
    let context = TestContext::new();
    context.enroll("A", &[1.0, 0.0, 0.0]).await;
    context.enroll("A", &[0.0, 0.0, 1.0]).await;

    let (status, _) = context
        .post("/api/identify", json!({ "vector": [1.0, 0.0, 0.0] }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = context
        .post("/api/identify", json!({ "vector": [0.0, 0.0, 1.0] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject_id"], "A");
}

#[tokio::test]
async fn deleted_subject_is_no_longer_identified() {
    let context = TestContext::new();
    context.enroll("A", &[0.3, 0.3, 0.9]).await;

    let (status, _) = context.delete("/api/templates/A", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = context
        .post("/api/identify", json!({ "vector": [0.3, 0.3, 0.9] }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identify_respects_model_tag_filter() {
    let context = TestContext::new();
    let (status, _) = context
        .post(
            "/api/templates",
            json!({ "subject_id": "A", "vector": [0.6, 0.8], "model_tag": "ArcFace" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = context
        .post("/api/identify", json!({ "vector": [0.6, 0.8], "model_tag": "Facenet" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = context
        .post("/api/identify", json!({ "vector": [0.6, 0.8], "model_tag": "ArcFace" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_session_ids_are_rejected() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let context = TestContext::new();
    for uri in [
        "/api/sessions/a%C3%A9%C3%A9%C3%A9%C3%A9",
        "/api/sessions/never-issued",
    ] {
        let (status, body) = context.delete(uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Malformed session id");

        let (status, _) = context.get(uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
