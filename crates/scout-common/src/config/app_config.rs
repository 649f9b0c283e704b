//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    /// Absent when rate-limit state stays in process memory
    pub redis: Option<RedisConfig>,
    pub competition: CompetitionConfig,
    pub tools: ToolConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Competition limits
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitionConfig {
    /// Active (non-cancelled, not ended) competitions allowed per server
    #[serde(default = "default_max_active_per_server")]
    pub max_active_per_server: usize,
    /// Upper bound accepted for `max_participants`
    #[serde(default = "default_max_participants_limit")]
    pub max_participants_limit: i32,
    /// Seconds a user must wait between two competition creations
    #[serde(default = "default_creation_cooldown_secs")]
    pub creation_cooldown_secs: u64,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            max_active_per_server: default_max_active_per_server(),
            max_participants_limit: default_max_participants_limit(),
            creation_cooldown_secs: default_creation_cooldown_secs(),
        }
    }
}

/// External analysis tool settings (knip, jscpd)
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_knip_command")]
    pub knip_command: String,
    #[serde(default = "default_jscpd_command")]
    pub jscpd_command: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_tool_timeout_secs(),
            knip_command: default_knip_command(),
            jscpd_command: default_jscpd_command(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "scout".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_max_active_per_server() -> usize {
    5
}

fn default_max_participants_limit() -> i32 {
    100
}

fn default_creation_cooldown_secs() -> u64 {
    60
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_tool_timeout_secs() -> u64 {
    120
}

fn default_knip_command() -> String {
    "npx knip".to_string()
}

fn default_jscpd_command() -> String {
    "npx jscpd".to_string()
}

/// Parse an optional variable, reporting unparsable values instead of silently defaulting
fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required keys are missing or malformed
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => {
                Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?
            }
            None => default_env(),
        };

        let redis = match lookup("REDIS_URL") {
            Some(url) if !url.trim().is_empty() => Some(RedisConfig {
                url,
                max_connections: parse_var(&lookup, "REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            }),
            _ => None,
        };

        let competition = CompetitionConfig {
            max_active_per_server: parse_var(&lookup, "COMPETITION_MAX_ACTIVE_PER_SERVER")?
                .unwrap_or_else(default_max_active_per_server),
            max_participants_limit: parse_var(&lookup, "COMPETITION_MAX_PARTICIPANTS")?
                .unwrap_or_else(default_max_participants_limit),
            creation_cooldown_secs: parse_var(&lookup, "COMPETITION_CREATION_COOLDOWN_SECS")?
                .unwrap_or_else(default_creation_cooldown_secs),
        };
        if competition.max_participants_limit < 2 {
            return Err(ConfigError::InvalidValue(
                "COMPETITION_MAX_PARTICIPANTS",
                competition.max_participants_limit.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            redis,
            competition,
            tools: ToolConfig {
                cache_ttl_secs: parse_var(&lookup, "TOOL_CACHE_TTL_SECS")?
                    .unwrap_or_else(default_cache_ttl_secs),
                timeout_secs: parse_var(&lookup, "TOOL_TIMEOUT_SECS")?
                    .unwrap_or_else(default_tool_timeout_secs),
                knip_command: lookup("KNIP_COMMAND").unwrap_or_else(default_knip_command),
                jscpd_command: lookup("JSCPD_COMMAND").unwrap_or_else(default_jscpd_command),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_environment_is_development() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Staging.is_development());
        assert!(!Environment::Production.is_development());
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_source(source(&[("DATABASE_URL", "postgres://localhost/scout")]))
            .unwrap();

        assert_eq!(config.app.name, "scout");
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.database.max_connections, 20);
        assert!(config.redis.is_none());
        assert_eq!(config.competition.max_active_per_server, 5);
        assert_eq!(config.competition.max_participants_limit, 100);
        assert_eq!(config.competition.creation_cooldown_secs, 60);
        assert_eq!(config.tools.cache_ttl_secs, 60);
        assert_eq!(config.tools.knip_command, "npx knip");
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_source(source(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = AppConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://localhost/scout"),
            ("TOOL_CACHE_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("TOOL_CACHE_TTL_SECS", _)));
    }

    #[test]
    fn test_redis_and_overrides() {
        let config = AppConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://localhost/scout"),
            ("APP_ENV", "Production"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("COMPETITION_MAX_ACTIVE_PER_SERVER", "2"),
        ]))
        .unwrap();

        assert!(config.app.env.is_production());
        assert_eq!(config.redis.unwrap().max_connections, 10);
        assert_eq!(config.competition.max_active_per_server, 2);
    }

    #[test]
    fn test_participant_limit_lower_bound() {
        let err = AppConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://localhost/scout"),
            ("COMPETITION_MAX_PARTICIPANTS", "1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("COMPETITION_MAX_PARTICIPANTS", _)));
    }
}
