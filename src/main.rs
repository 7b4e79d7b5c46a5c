use axum::extract::DefaultBodyLimit;
use anyhow::Context;
use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::{Any, CorsLayer},
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facegate::config::Config;
use facegate::middleware_layer::auth::SESSION_HEADER;
use facegate::routes::build_router;
use facegate::state::AppState;

/// Largest accepted request body. A 4096-dimension vector in JSON fits easily.
const MAX_BODY_BYTES: usize = 256 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!(
        "✅ Configuration loaded (threshold {}, session ttl {}s)",
        config.similarity_threshold,
        config.session_ttl_seconds
    );

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static(SESSION_HEADER),
        ])
        .max_age(Duration::from_secs(86400));

    // One request per 100 ms per client IP, bursts of 50.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(100)
            .burst_size(50)
            .use_headers()
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let app = build_router(state)
        .layer(tower_governor::GovernorLayer::new(governor_conf.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors);

    let addr = config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
