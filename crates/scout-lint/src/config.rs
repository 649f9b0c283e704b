//! Lint configuration: ignored paths and per-rule severity

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{LintError, LintResult};

/// Rule severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Warn,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "0" => Ok(Self::Off),
            "warn" | "1" => Ok(Self::Warn),
            "error" | "2" => Ok(Self::Error),
            _ => Err(LintError::InvalidConfig(format!("Unknown severity: {s}"))),
        }
    }
}

/// Translate a path glob into an anchored regex
///
/// `**` crosses directories, `*` and `?` do not. A pattern without `/`
/// matches at any depth, and every pattern also matches everything below a
/// directory it names.
fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let glob = glob.trim_start_matches("./");
    let mut pattern = String::from("^");
    if !glob.contains('/') {
        pattern.push_str("(?:.*/)?");
    }

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    pattern.push_str("(?:.*/)?");
                } else {
                    pattern.push_str(".*");
                }
            }
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }

    pattern.push_str("(?:/.*)?$");
    Regex::new(&pattern)
}

#[derive(Debug, Default, Deserialize)]
struct RawLintConfig {
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    rules: HashMap<String, Severity>,
}

/// Which files to skip and how loud each rule is
#[derive(Debug, Clone, Default)]
pub struct LintConfig {
    ignore_globs: Vec<String>,
    ignore: Vec<Regex>,
    rules: HashMap<String, Severity>,
}

impl LintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"ignore": [...], "rules": {"rule-name": "off|warn|error"}}`
    pub fn from_json(json: &str) -> LintResult<Self> {
        let raw: RawLintConfig =
            serde_json::from_str(json).map_err(|e| LintError::InvalidConfig(e.to_string()))?;

        let mut config = Self::new();
        for glob in &raw.ignore {
            config = config.with_ignore(glob)?;
        }
        config.rules = raw.rules;
        Ok(config)
    }

    /// Skip files matching `glob`
    pub fn with_ignore(mut self, glob: &str) -> LintResult<Self> {
        let regex = glob_to_regex(glob).map_err(|source| LintError::InvalidGlob {
            glob: glob.to_string(),
            source,
        })?;
        self.ignore_globs.push(glob.to_string());
        self.ignore.push(regex);
        Ok(self)
    }

    /// Override the severity of one rule
    pub fn with_rule(mut self, rule: &str, severity: Severity) -> Self {
        self.rules.insert(rule.to_string(), severity);
        self
    }

    pub fn ignore_globs(&self) -> &[String] {
        &self.ignore_globs
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let normalized = normalized.trim_start_matches("./");
        self.ignore.iter().any(|re| re.is_match(normalized))
    }

    /// Configured severity, or `default` when the rule is not mentioned
    pub fn severity_for(&self, rule: &str, default: Severity) -> Severity {
        self.rules.get(rule).copied().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_globs() {
        let config = LintConfig::new()
            .with_ignore("dist/**")
            .unwrap()
            .with_ignore("**/*.generated.ts")
            .unwrap()
            .with_ignore("node_modules")
            .unwrap();

        assert!(config.is_ignored("dist/index.js"));
        assert!(config.is_ignored("./dist/nested/a.js"));
        assert!(config.is_ignored("src/api/client.generated.ts"));
        assert!(config.is_ignored("client.generated.ts"));
        assert!(config.is_ignored("packages/app/node_modules/zod/index.ts"));

        assert!(!config.is_ignored("src/dist.ts"));
        assert!(!config.is_ignored("src/client.ts"));
    }

    #[test]
    fn test_single_star_stays_in_directory() {
        let config = LintConfig::new().with_ignore("src/*.test.ts").unwrap();
        assert!(config.is_ignored("src/a.test.ts"));
        assert!(!config.is_ignored("src/nested/a.test.ts"));
    }

    #[test]
    fn test_severity_overrides() {
        let config = LintConfig::from_json(
            r#"{"ignore": ["build/**"], "rules": {"no-use-effect": "off", "no-type-assertions": "warn"}}"#,
        )
        .unwrap();

        assert_eq!(config.severity_for("no-use-effect", Severity::Error), Severity::Off);
        assert_eq!(config.severity_for("no-type-assertions", Severity::Error), Severity::Warn);
        assert_eq!(config.severity_for("other", Severity::Error), Severity::Error);
        assert!(config.is_ignored("build/out.js"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(LintConfig::from_json(r#"{"rules": {"x": "loud"}}"#).is_err());
        assert_eq!("2".parse::<Severity>().unwrap(), Severity::Error);
    }
}
