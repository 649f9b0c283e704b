//! Service context construction for integration tests

use anyhow::Result;
use scout_cache::CreationRateLimiter;
use scout_common::CompetitionConfig;
use scout_core::{PermissionType, Snowflake};
use scout_db::{connect, run_migrations, PoolSettings};
use scout_service::{PermissionService, ServiceContext};

/// Limits used by every test context
pub fn test_limits() -> CompetitionConfig {
    CompetitionConfig::default()
}

/// Context over in-memory repositories
pub fn in_memory_context() -> ServiceContext {
    ServiceContext::in_memory(test_limits())
}

/// Context over PostgreSQL, or `None` when `DATABASE_URL` is not set
pub async fn postgres_context() -> Result<Option<ServiceContext>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("Skipping: DATABASE_URL not set");
        return Ok(None);
    };

    let settings = PoolSettings {
        max_connections: 4,
        ..PoolSettings::for_url(url)
    };
    let pool = connect(&settings).await?;
    run_migrations(&pool).await?;

    let limits = test_limits();
    let limiter = CreationRateLimiter::in_memory(limits.creation_cooldown_secs);
    Ok(Some(ServiceContext::postgres(pool, limiter, limits)))
}

/// Give `user_id` the grant needed to create competitions
pub async fn grant_creator(ctx: &ServiceContext, server_id: Snowflake, user_id: Snowflake) -> Result<()> {
    PermissionService::new(ctx)
        .grant_permission(server_id, user_id, PermissionType::CreateCompetition, Snowflake::new(1))
        .await?;
    Ok(())
}
