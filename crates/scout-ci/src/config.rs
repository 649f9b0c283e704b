//! `scout-ci.toml` plus `SCOUT_CI__*` environment overrides
//!
//! ```toml
//! step_timeout_secs = 900
//!
//! [backend]
//! registry = "ghcr.io/acme"
//! image = "scout-backend"
//!
//! [[packages]]
//! name = "backend"
//! path = "packages/backend"
//! check = ["typecheck", "lint", "test"]
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_common::ToolConfig;
use scout_lint::{LintConfig, LintResult, Severity};

use crate::error::{CiError, CiResult};

pub const DEFAULT_CONFIG_FILE: &str = "scout-ci.toml";
const ENV_PREFIX: &str = "SCOUT_CI";

#[derive(Debug, Clone, Deserialize)]
pub struct CiConfig {
    /// Per-step limit; the whole step is killed when exceeded
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
    #[serde(default = "default_packages")]
    pub packages: Vec<PackageConfig>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub lint: LintSettings,
    #[serde(default)]
    pub tools: ToolConfig,
}

/// One workspace package driven through `bun`
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    pub name: String,
    /// Relative to the source root
    pub path: PathBuf,
    /// `bun run` scripts executed in order by `check-package`
    #[serde(default = "default_check_scripts")]
    pub check: Vec<String>,
    #[serde(default = "default_build_script")]
    pub build: String,
    /// Build output, relative to the package
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    #[serde(default = "default_coverage_dir")]
    pub coverage_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Package holding the Prisma schema and the Dockerfile
    #[serde(default = "default_backend_package")]
    pub package: String,
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default = "default_registry_user")]
    pub registry_user: String,
    #[serde(default = "default_image")]
    pub image: String,
    /// Relative to the backend package
    #[serde(default = "default_dockerfile")]
    pub dockerfile: PathBuf,
    /// Command run inside the built image by the smoke test
    #[serde(default = "default_smoke_command")]
    pub smoke_command: Vec<String>,
    /// Text the smoke command must print
    #[serde(default = "default_smoke_expect")]
    pub smoke_expect: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            package: default_backend_package(),
            registry: default_registry(),
            registry_user: default_registry_user(),
            image: default_image(),
            dockerfile: default_dockerfile(),
            smoke_command: default_smoke_command(),
            smoke_expect: default_smoke_expect(),
        }
    }
}

impl BackendConfig {
    /// `registry/image:tag`
    pub fn image_ref(&self, tag: &str) -> String {
        format!("{}/{}:{tag}", self.registry.trim_end_matches('/'), self.image)
    }

    /// Host part of the registry, the argument to `docker login`
    pub fn registry_host(&self) -> &str {
        self.registry.split('/').next().unwrap_or(&self.registry)
    }
}

/// Lint command settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LintSettings {
    /// Globs of files never linted
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub rules: HashMap<String, Severity>,
}

impl LintSettings {
    pub fn to_lint_config(&self) -> LintResult<LintConfig> {
        let mut config = LintConfig::new();
        for glob in &self.ignore {
            config = config.with_ignore(glob)?;
        }
        for (rule, severity) in &self.rules {
            config = config.with_rule(rule, *severity);
        }
        Ok(config)
    }
}

fn default_step_timeout_secs() -> u64 {
    1800
}

fn default_packages() -> Vec<PackageConfig> {
    ["backend", "frontend", "desktop", "report", "data"]
        .into_iter()
        .map(|name| PackageConfig {
            name: name.to_string(),
            path: Path::new("packages").join(name),
            check: default_check_scripts(),
            build: default_build_script(),
            artifact_dir: default_artifact_dir(),
            coverage_dir: default_coverage_dir(),
        })
        .collect()
}

fn default_check_scripts() -> Vec<String> {
    vec!["typecheck".to_string(), "lint".to_string(), "test".to_string()]
}

fn default_build_script() -> String {
    "build".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_coverage_dir() -> PathBuf {
    PathBuf::from("coverage")
}

fn default_backend_package() -> String {
    "backend".to_string()
}

fn default_registry() -> String {
    "ghcr.io/scout".to_string()
}

fn default_registry_user() -> String {
    "scout-ci".to_string()
}

fn default_image() -> String {
    "scout-backend".to_string()
}

fn default_dockerfile() -> PathBuf {
    PathBuf::from("Dockerfile")
}

fn default_smoke_command() -> Vec<String> {
    vec!["bun".to_string(), "run".to_string(), "healthcheck".to_string()]
}

fn default_smoke_expect() -> String {
    "ok".to_string()
}

impl CiConfig {
    /// Load `path` (or `scout-ci.toml` in the working directory when present)
    /// and apply `SCOUT_CI__SECTION__KEY` overrides
    pub fn load(path: Option<&Path>) -> CiResult<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Self::validated(config.try_deserialize()?)
    }

    /// Parse TOML text without consulting the environment
    pub fn from_toml(toml: &str) -> CiResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Self::validated(config.try_deserialize()?)
    }

    fn validated(config: Self) -> CiResult<Self> {
        if config.step_timeout_secs == 0 {
            return Err(config::ConfigError::Message("step_timeout_secs must be positive".to_string()).into());
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = config.packages.iter().find(|p| !seen.insert(p.name.as_str())) {
            return Err(config::ConfigError::Message(format!("package {} is declared twice", duplicate.name)).into());
        }
        if config.package(&config.backend.package).is_err() {
            return Err(config::ConfigError::Message(format!(
                "backend package {} is not declared",
                config.backend.package
            ))
            .into());
        }
        Ok(config)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn package(&self, name: &str) -> CiResult<&PackageConfig> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CiError::UnknownPackage(name.to_string()))
    }

    pub fn backend_package(&self) -> CiResult<&PackageConfig> {
        self.package(&self.backend.package)
    }
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: default_step_timeout_secs(),
            packages: default_packages(),
            backend: BackendConfig::default(),
            lint: LintSettings::default(),
            tools: ToolConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = CiConfig::from_toml("").unwrap();

        assert_eq!(config.step_timeout(), Duration::from_secs(1800));
        assert_eq!(config.packages.len(), 5);
        let backend = config.backend_package().unwrap();
        assert_eq!(backend.path, Path::new("packages/backend"));
        assert_eq!(backend.check, vec!["typecheck", "lint", "test"]);
        assert_eq!(config.backend.image_ref("1.2.0"), "ghcr.io/scout/scout-backend:1.2.0");
        assert_eq!(config.backend.registry_host(), "ghcr.io");
        assert_eq!(config.tools.knip_command, "npx knip");
    }

    #[test]
    fn test_packages_and_lint_settings() {
        let config = CiConfig::from_toml(
            r#"
            step_timeout_secs = 60

            [backend]
            registry = "registry.example.com/team/"
            package = "api"

            [[packages]]
            name = "api"
            path = "services/api"
            check = ["lint"]

            [lint]
            ignore = ["dist/**"]
            rules = { "no-use-effect" = "off" }
            "#,
        )
        .unwrap();

        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.package("api").unwrap().build, "build");
        assert_eq!(config.backend.image_ref("sha"), "registry.example.com/team/scout-backend:sha");
        assert!(matches!(config.package("frontend"), Err(CiError::UnknownPackage(_))));

        let lint = config.lint.to_lint_config().unwrap();
        assert!(lint.is_ignored("dist/index.js"));
        assert_eq!(lint.severity_for("no-use-effect", Severity::Warn), Severity::Off);
    }

    #[test]
    fn test_rejects_unknown_backend_package() {
        let err = CiConfig::from_toml(
            r#"
            [[packages]]
            name = "web"
            path = "web"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("backend package backend"));
    }

    #[test]
    fn test_rejects_duplicate_packages() {
        let err = CiConfig::from_toml(
            r#"
            [[packages]]
            name = "backend"
            path = "a"

            [[packages]]
            name = "backend"
            path = "b"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci.toml");
        std::fs::write(&path, "step_timeout_secs = 42\n").unwrap();

        let config = CiConfig::load(Some(&path)).unwrap();
        assert_eq!(config.step_timeout_secs, 42);

        assert!(CiConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
