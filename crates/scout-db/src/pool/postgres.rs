//! PostgreSQL pool and migrations

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    /// Idle connections above `min_connections` are closed after this
    pub idle_timeout: Duration,
}

impl PoolSettings {
    /// Defaults for everything but the URL
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl From<&scout_common::DatabaseConfig> for PoolSettings {
    fn from(config: &scout_common::DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections.min(config.max_connections),
            ..Self::for_url(config.url.clone())
        }
    }
}

/// Open a pool; the first connection is established eagerly
#[instrument(skip(settings), fields(max = settings.max_connections))]
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .connect(&settings.url)
        .await?;
    info!("Database pool ready");
    Ok(pool)
}

/// Apply the SQL files under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = Migrator::new(dir).await?;
    migrator.run(pool).await?;
    info!(count = migrator.iter().count(), "Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_for_url() {
        let settings = PoolSettings::for_url("postgres://localhost/scout");
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.min_connections, 1);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_settings_from_app_config() {
        let app = scout_common::DatabaseConfig {
            url: "postgres://db/scout".to_string(),
            max_connections: 4,
            min_connections: 6,
        };
        let settings = PoolSettings::from(&app);
        assert_eq!(settings.url, "postgres://db/scout");
        assert_eq!(settings.max_connections, 4);
        // never more idle connections than the pool can hold
        assert_eq!(settings.min_connections, 4);
        assert_eq!(settings.idle_timeout, Duration::from_secs(300));
    }
}
