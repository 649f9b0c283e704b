//! Redis-backed rate-limit store shared by every bot instance

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::AsyncCommands;
use std::time::Duration;

use scout_core::Snowflake;

use super::RateLimitStore;
use crate::error::{CacheError, CacheResult};
use crate::pool::RedisPool;

/// Key prefix for creation timestamps
const RATE_LIMIT_PREFIX: &str = "competition_creation:";

/// Rate-limit state in Redis; entries expire with their retention window
#[derive(Clone, Debug)]
pub struct RedisRateLimitStore {
    pool: RedisPool,
}

impl RedisRateLimitStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(server_id: Snowflake, user_id: Snowflake) -> String {
        format!("{RATE_LIMIT_PREFIX}{server_id}:{user_id}")
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn last_creation(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
    ) -> CacheResult<Option<DateTime<Utc>>> {
        let key = Self::key(server_id, user_id);
        let mut conn = self.pool.get().await?;
        let millis: Option<i64> = conn.get(&key).await?;

        match millis {
            Some(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .map(Some)
                .ok_or_else(|| CacheError::CorruptEntry {
                    key,
                    detail: format!("timestamp {ms} out of range"),
                }),
            None => Ok(None),
        }
    }

    async fn record_creation(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
        retention: Duration,
    ) -> CacheResult<()> {
        let key = Self::key(server_id, user_id);
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(&key, at.timestamp_millis(), retention.as_secs().max(1))
            .await?;
        tracing::debug!(%server_id, %user_id, "Recorded competition creation");
        Ok(())
    }

    async fn reset(&self, server_id: Snowflake, user_id: Snowflake) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(Self::key(server_id, user_id)).await?;
        Ok(())
    }
}
