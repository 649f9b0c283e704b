//! Running one step as a process

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{CiError, CiResult};
use crate::secret::Secret;

/// A single command in a pipeline
#[derive(Debug, Clone)]
pub struct Step {
    /// Label used in logs and errors, e.g. `backend: bun run lint`
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    /// Written to the process's stdin, then closed
    pub stdin: Option<Secret>,
}

impl Step {
    pub fn new(name: impl Into<String>, program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            env: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin_secret(mut self, secret: Secret) -> Self {
        self.stdin = Some(secret);
        self
    }

    /// Program and arguments as one line; secrets never appear in argv
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What a finished step produced
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl StepOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs steps; a non-zero exit is an `Ok` output, only launch problems are errors
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, step: &Step) -> CiResult<StepOutput>;
}

/// Executes steps as child processes with a per-step timeout
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Duration,
}

impl ProcessExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    #[instrument(skip(self, step), fields(step = %step.name))]
    async fn execute(&self, step: &Step) -> CiResult<StepOutput> {
        let mut command = Command::new(&step.program);
        command
            .args(&step.args)
            .current_dir(&step.cwd)
            .envs(step.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if step.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(command = %step.command_line(), cwd = %step.cwd.display(), "Spawning step");
        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| CiError::Spawn {
            step: step.name.clone(),
            source,
        })?;

        if let (Some(secret), Some(mut stdin)) = (&step.stdin, child.stdin.take()) {
            stdin.write_all(secret.expose().as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CiError::StepTimeout {
                step: step.name.clone(),
                after: self.timeout,
            })??;

        let redact = |bytes: &[u8]| {
            let text = String::from_utf8_lossy(bytes);
            match &step.stdin {
                Some(secret) => secret.redact(&text),
                None => text.into_owned(),
            }
        };
        Ok(StepOutput {
            code: output.status.code(),
            stdout: redact(&output.stdout),
            stderr: redact(&output.stderr),
            elapsed: started.elapsed(),
        })
    }
}

/// Records steps instead of running them; every step succeeds
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    executed: Mutex<Vec<Step>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps seen so far, in completion order
    pub fn executed(&self) -> Vec<Step> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl CommandExecutor for DryRunExecutor {
    async fn execute(&self, step: &Step) -> CiResult<StepOutput> {
        debug!(step = %step.name, command = %step.command_line(), "Dry run");
        self.executed.lock().push(step.clone());
        Ok(StepOutput {
            code: Some(0),
            ..StepOutput::default()
        })
    }
}
