//! Cache error types

use scout_core::DomainError;

/// Error type for cache and Redis operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt cache entry for {key}: {detail}")]
    CorruptEntry { key: String, detail: String },
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for DomainError {
    fn from(err: CacheError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}
