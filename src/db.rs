use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::crypto::key::DeploymentKey;
use crate::error::{AppError, Result};
use std::time::Duration;

const SCHEMA: &str = include_str!("../migrations/001_init.sql");

/// Builds the template store's connection pool from `DATABASE_URL`.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    let pg_config: tokio_postgres::Config = database_url.parse()?;

    if let Some(tokio_postgres::config::Host::Tcp(hostname)) = pg_config.get_hosts().first() {
        cfg.host = Some(hostname.to_string());
    }

    if let Some(port) = pg_config.get_ports().first() {
        cfg.port = Some(*port);
    }

    if let Some(dbname) = pg_config.get_dbname() {
        cfg.dbname = Some(dbname.to_string());
    }

    if let Some(user) = pg_config.get_user() {
        cfg.user = Some(user.to_string());
    }

    if let Some(password) = pg_config.get_password() {
        cfg.password = Some(String::from_utf8_lossy(password).to_string());
    }

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.pool = Some(PoolConfig {
        max_size: 32,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(2)),
            recycle: Some(Duration::from_secs(1)),
        },
        ..Default::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(AppError::from)
}

/// Applies the schema. Every statement is idempotent.
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    tracing::info!("✅ Database schema is up to date");
    Ok(())
}

/// Records the deployment key's fingerprint on first start and refuses a
/// different key afterwards.
///
/// Templates sealed under one key cannot be opened with another, so starting
/// with the wrong key would silently turn every identification into a miss.
pub async fn ensure_deployment_key(pool: &Pool, key: &DeploymentKey) -> Result<()> {
    let client = pool.get().await?;
    let fingerprint = key.fingerprint().to_vec();

    client
        .execute(
            r#"
            INSERT INTO deployment_key (id, fingerprint)
            VALUES (1, $1)
            ON CONFLICT (id) DO NOTHING
            "#,
            &[&fingerprint],
        )
        .await?;

    let row = client
        .query_one("SELECT fingerprint FROM deployment_key WHERE id = 1", &[])
        .await?;
    let stored: Vec<u8> = row
        .try_get("fingerprint")
        .map_err(|_| AppError::MissingData("fingerprint".to_string()))?;

    if !key.matches_fingerprint(&stored) {
        tracing::error!("❌ ENCRYPTION_KEY does not match the key this database was sealed with");
        return Err(AppError::Crypto(
            "Deployment key does not match stored fingerprint".to_string(),
        ));
    }

    tracing::info!("✅ Deployment key verified against stored fingerprint");
    Ok(())
}
