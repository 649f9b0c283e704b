//! Per-process rate-limit store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

use scout_core::Snowflake;

use super::RateLimitStore;
use crate::error::CacheResult;

/// Rate-limit state held in process memory
///
/// Not shared across bot instances and lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    last_creation: DashMap<(Snowflake, Snowflake), DateTime<Utc>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop records older than `retention`
    pub fn prune(&self, now: DateTime<Utc>, retention: Duration) {
        let Ok(retention) = chrono::Duration::from_std(retention) else {
            return;
        };
        self.last_creation.retain(|_, at| now - *at < retention);
    }

    pub fn len(&self) -> usize {
        self.last_creation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_creation.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn last_creation(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
    ) -> CacheResult<Option<DateTime<Utc>>> {
        Ok(self
            .last_creation
            .get(&(server_id, user_id))
            .map(|entry| *entry.value()))
    }

    async fn record_creation(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
        retention: Duration,
    ) -> CacheResult<()> {
        self.last_creation.insert((server_id, user_id), at);
        self.prune(at, retention);
        Ok(())
    }

    async fn reset(&self, server_id: Snowflake, user_id: Snowflake) -> CacheResult<()> {
        self.last_creation.remove(&(server_id, user_id));
        Ok(())
    }
}
