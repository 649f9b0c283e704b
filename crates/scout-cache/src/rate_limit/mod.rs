//! Competition creation rate limiting
//!
//! Remembers when each `(server, user)` pair last created a competition.

mod limiter;
mod memory_store;
mod redis_store;

pub use limiter::{CreationRateLimiter, RateLimitDecision};
pub use memory_store::InMemoryRateLimitStore;
pub use redis_store::RedisRateLimitStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use scout_core::Snowflake;

use crate::error::CacheResult;

/// Storage for last-creation timestamps
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// When this user last created a competition in this server
    async fn last_creation(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
    ) -> CacheResult<Option<DateTime<Utc>>>;

    /// Record a creation; the record may be dropped once `retention` has passed
    async fn record_creation(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
        retention: Duration,
    ) -> CacheResult<()>;

    /// Forget the record for this pair
    async fn reset(&self, server_id: Snowflake, user_id: Snowflake) -> CacheResult<()>;
}
