//! Cooldown between competition creations

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use scout_core::Snowflake;

use super::{InMemoryRateLimitStore, RateLimitStore, RedisRateLimitStore};
use crate::error::CacheResult;
use crate::pool::RedisPool;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: i64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Enforces a minimum interval between two creations by the same user in the same server
#[derive(Clone)]
pub struct CreationRateLimiter {
    store: Arc<dyn RateLimitStore>,
    cooldown: Duration,
}

impl std::fmt::Debug for CreationRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationRateLimiter")
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl CreationRateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, cooldown_secs: u64) -> Self {
        Self {
            store,
            cooldown: Duration::from_secs(cooldown_secs),
        }
    }

    /// Limiter over a fresh in-memory store
    pub fn in_memory(cooldown_secs: u64) -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()), cooldown_secs)
    }

    /// Redis-backed when `redis` is configured, in memory otherwise
    pub fn from_config(redis: Option<&scout_common::RedisConfig>, cooldown_secs: u64) -> CacheResult<Self> {
        let Some(redis) = redis else {
            return Ok(Self::in_memory(cooldown_secs));
        };
        let store = RedisRateLimitStore::new(RedisPool::from_config(redis)?);
        Ok(Self::new(Arc::new(store), cooldown_secs))
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether a creation at `now` is allowed
    #[instrument(skip(self))]
    pub async fn check(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> CacheResult<RateLimitDecision> {
        let Some(last) = self.store.last_creation(server_id, user_id).await? else {
            return Ok(RateLimitDecision::Allowed);
        };

        let cooldown_ms = i64::try_from(self.cooldown.as_millis()).unwrap_or(i64::MAX);
        let elapsed_ms = (now - last).num_milliseconds();
        if elapsed_ms >= cooldown_ms {
            return Ok(RateLimitDecision::Allowed);
        }

        // Round up so that "retry in 0s" never happens
        let remaining_ms = cooldown_ms - elapsed_ms;
        let retry_after_secs = (remaining_ms + 999) / 1000;
        debug!(retry_after_secs, "Competition creation rate limited");
        Ok(RateLimitDecision::Limited { retry_after_secs })
    }

    /// Remember a successful creation at `at`
    #[instrument(skip(self))]
    pub async fn record(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> CacheResult<()> {
        self.store
            .record_creation(server_id, user_id, at, self.cooldown)
            .await
    }

    pub async fn reset(&self, server_id: Snowflake, user_id: Snowflake) -> CacheResult<()> {
        self.store.reset(server_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Snowflake, Snowflake) {
        (Snowflake::new(111), Snowflake::new(222))
    }

    #[tokio::test]
    async fn test_first_creation_allowed() {
        let limiter = CreationRateLimiter::in_memory(60);
        let (server, user) = ids();
        let decision = limiter.check(server, user, Utc::now()).await.unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_within_cooldown_is_limited() {
        let limiter = CreationRateLimiter::in_memory(60);
        let (server, user) = ids();
        let start = Utc::now();

        limiter.record(server, user, start).await.unwrap();
        let decision = limiter
            .check(server, user, start + chrono::Duration::seconds(15))
            .await
            .unwrap();
        assert_eq!(decision, RateLimitDecision::Limited { retry_after_secs: 45 });

        let decision = limiter
            .check(server, user, start + chrono::Duration::milliseconds(59_500))
            .await
            .unwrap();
        assert_eq!(decision, RateLimitDecision::Limited { retry_after_secs: 1 });
    }

    #[tokio::test]
    async fn test_after_cooldown_allowed() {
        let limiter = CreationRateLimiter::in_memory(60);
        let (server, user) = ids();
        let start = Utc::now();

        limiter.record(server, user, start).await.unwrap();
        let decision = limiter
            .check(server, user, start + chrono::Duration::seconds(60))
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_from_config_without_redis() {
        let limiter = CreationRateLimiter::from_config(None, 30).unwrap();
        assert_eq!(limiter.cooldown(), Duration::from_secs(30));
        let (server, user) = ids();
        assert!(limiter.check(server, user, Utc::now()).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_from_config_with_redis_is_lazy() {
        let redis = scout_common::RedisConfig {
            url: "redis://127.0.0.1:6399".to_string(),
            max_connections: 2,
        };
        assert!(CreationRateLimiter::from_config(Some(&redis), 30).is_ok());
    }

    #[tokio::test]
    async fn test_reset_clears_limit() {
        let limiter = CreationRateLimiter::in_memory(60);
        let (server, user) = ids();
        let now = Utc::now();

        limiter.record(server, user, now).await.unwrap();
        limiter.reset(server, user).await.unwrap();
        assert!(limiter.check(server, user, now).await.unwrap().is_allowed());
    }
}
