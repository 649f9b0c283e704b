//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CompetitionConfig, ConfigError, DatabaseConfig, Environment,
    RedisConfig, ToolConfig,
};
