//! # scout-common
//!
//! Configuration, the application error, and tracing setup shared by every
//! scout crate.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{
    AppConfig, AppSettings, CompetitionConfig, ConfigError, DatabaseConfig, Environment,
    RedisConfig, ToolConfig,
};
pub use error::{AppError, AppResult, ErrorReply};
pub use telemetry::{
    try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError,
};
