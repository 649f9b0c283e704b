//! # scout-cache
//!
//! Process-local caches and the competition creation rate limiter.
//!
//! ## Features
//!
//! - **Tool-result cache**: TTL memoization for expensive whole-project tools
//! - **Rate limiting**: last-creation timestamps per `(server, user)`, kept in
//!   memory or in Redis when several bot instances share the limit
//! - **Redis pool**: deadpool-redis connections for the shared store
//!
//! ## Example
//!
//! ```ignore
//! use scout_cache::{CreationRateLimiter, InMemoryRateLimitStore, ToolResultCache};
//!
//! let knip_cache: ToolResultCache<KnipReport> = ToolResultCache::default();
//! let report = knip_cache.get_or_compute_async(root, None, || run_knip(root)).await?;
//!
//! let limiter = CreationRateLimiter::new(Arc::new(InMemoryRateLimitStore::new()), 60);
//! if let RateLimitDecision::Limited { retry_after_secs } = limiter.check(server, user, now).await? {
//!     // reject
//! }
//! ```

pub mod error;
pub mod pool;
pub mod rate_limit;
pub mod tool_cache;

pub use error::{CacheError, CacheResult};
pub use pool::RedisPool;
pub use rate_limit::{
    CreationRateLimiter, InMemoryRateLimitStore, RateLimitDecision, RateLimitStore,
    RedisRateLimitStore,
};
pub use tool_cache::{ToolResultCache, DEFAULT_TOOL_CACHE_TTL};
