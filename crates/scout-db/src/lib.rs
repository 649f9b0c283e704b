//! # scout-db
//!
//! Database layer implementing the repository traits of `scout-core`.
//!
//! ## Overview
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity <-> Model mappers
//! - PostgreSQL repository implementations
//! - In-memory repository implementations for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scout_db::{connect, run_migrations, PgCompetitionRepository, PoolSettings};
//!
//! async fn example(config: &scout_common::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = connect(&PoolSettings::from(&config.database)).await?;
//!     run_migrations(&pool).await?;
//!     let competitions = PgCompetitionRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

pub use memory::{
    InMemoryCompetitionRepository, InMemoryParticipantRepository, InMemoryPermissionRepository,
    InMemoryPlayerRepository,
};
pub use pool::{connect, run_migrations, PgPool, PoolSettings};
pub use repositories::{
    PgCompetitionRepository, PgParticipantRepository, PgPermissionRepository, PgPlayerRepository,
};
