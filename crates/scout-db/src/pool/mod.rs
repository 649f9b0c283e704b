//! Connection pool

mod postgres;

pub use postgres::{connect, run_migrations, PoolSettings};
pub use sqlx::postgres::PgPool;
