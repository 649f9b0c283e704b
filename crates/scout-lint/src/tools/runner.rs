//! Spawns knip and jscpd and caches their reports per project root

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use scout_cache::ToolResultCache;
use scout_common::ToolConfig;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{JscpdReport, KnipReport};
use crate::error::ToolError;

const KNIP: &str = "knip";
const JSCPD: &str = "jscpd";
const JSCPD_REPORT_FILE: &str = "jscpd-report.json";
const STDERR_TAIL_LINES: usize = 10;

/// Commands and limits for the external tools
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Program and leading arguments, whitespace separated
    pub knip_command: String,
    pub jscpd_command: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from(&ToolConfig::default())
    }
}

impl From<&ToolConfig> for ToolSettings {
    fn from(config: &ToolConfig) -> Self {
        Self {
            knip_command: config.knip_command.clone(),
            jscpd_command: config.jscpd_command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        }
    }
}

pub struct ToolRunner {
    settings: ToolSettings,
    knip_cache: ToolResultCache<Arc<KnipReport>>,
    jscpd_cache: ToolResultCache<Arc<JscpdReport>>,
}

impl std::fmt::Debug for ToolRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRunner")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ToolRunner {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            knip_cache: ToolResultCache::new(settings.cache_ttl),
            jscpd_cache: ToolResultCache::new(settings.cache_ttl),
            settings,
        }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Unused files and exports, cached per project root
    #[instrument(skip(self), fields(root = %project_root.display()))]
    pub async fn knip(&self, project_root: &Path) -> Result<Arc<KnipReport>, ToolError> {
        let key = project_root.to_string_lossy().into_owned();
        self.knip_cache
            .get_or_compute_async(&key, None, || async {
                let args = [OsString::from("--reporter"), OsString::from("json")];
                let output = run(KNIP, &self.settings.knip_command, &args, project_root, self.settings.timeout).await?;
                let report: KnipReport = parse_report(KNIP, &output.stdout, &output)?;

                info!(
                    unused_files = report.files.len(),
                    unused_exports = report.unused_export_count(),
                    "knip finished"
                );
                Ok::<_, ToolError>(Arc::new(report))
            })
            .await
    }

    /// Duplicated blocks, cached per project root
    #[instrument(skip(self), fields(root = %project_root.display()))]
    pub async fn jscpd(&self, project_root: &Path) -> Result<Arc<JscpdReport>, ToolError> {
        let key = project_root.to_string_lossy().into_owned();
        self.jscpd_cache
            .get_or_compute_async(&key, None, || async {
                let report_dir = std::env::temp_dir().join(format!("scout-jscpd-{}", Uuid::new_v4()));
                let args = [
                    OsString::from("--reporters"),
                    OsString::from("json"),
                    OsString::from("--output"),
                    report_dir.clone().into_os_string(),
                    OsString::from("--silent"),
                    OsString::from("."),
                ];

                let result = match run(JSCPD, &self.settings.jscpd_command, &args, project_root, self.settings.timeout).await {
                    Ok(output) => read_jscpd_report(&report_dir, &output).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = tokio::fs::remove_dir_all(&report_dir).await {
                    debug!(dir = %report_dir.display(), error = %e, "jscpd report dir not removed");
                }

                let report = result?;
                info!(
                    clones = report.duplicates.len(),
                    duplicated_lines = report.duplicated_lines(),
                    "jscpd finished"
                );
                Ok::<_, ToolError>(Arc::new(report))
            })
            .await
    }

    /// Forget cached reports for `project_root`
    pub fn invalidate(&self, project_root: &Path) {
        let key = project_root.to_string_lossy();
        self.knip_cache.invalidate(&key);
        self.jscpd_cache.invalidate(&key);
    }
}

async fn run(
    tool: &'static str,
    command_line: &str,
    args: &[OsString],
    cwd: &Path,
    timeout: Duration,
) -> Result<Output, ToolError> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or(ToolError::EmptyCommand(tool))?;

    let mut command = Command::new(program);
    command
        .args(parts)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    debug!(tool, command = command_line, "Starting tool");
    let started = Instant::now();
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| {
            warn!(tool, ?timeout, "Tool timed out");
            ToolError::Timeout { tool, after: timeout }
        })?
        .map_err(|source| ToolError::Spawn { tool, source })?;

    debug!(
        tool,
        code = ?output.status.code(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Tool exited"
    );
    Ok(output)
}

/// Both tools exit non-zero when they find issues, so a parseable report wins
/// over the exit status.
fn parse_report<T: DeserializeOwned>(tool: &'static str, raw: &[u8], output: &Output) -> Result<T, ToolError> {
    match serde_json::from_slice(raw) {
        Ok(report) => Ok(report),
        Err(_) if !output.status.success() => Err(failed(tool, output)),
        Err(source) => Err(ToolError::InvalidOutput { tool, source }),
    }
}

async fn read_jscpd_report(report_dir: &Path, output: &Output) -> Result<JscpdReport, ToolError> {
    match tokio::fs::read(report_dir.join(JSCPD_REPORT_FILE)).await {
        Ok(raw) => parse_report(JSCPD, &raw, output),
        Err(_) if !output.status.success() => Err(failed(JSCPD, output)),
        // Nothing to scan
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(JscpdReport::default()),
        Err(e) => Err(ToolError::Io(e)),
    }
}

fn failed(tool: &'static str, output: &Output) -> ToolError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
    ToolError::Failed {
        tool,
        code: output.status.code(),
        stderr: tail,
    }
}
