//! `scout-ci` command line

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use scout_annotations::{
    parse_cargo_fmt_output, parse_cargo_json, parse_cargo_test_output, parse_eslint_json,
    parse_rust_output, parse_stack_trace, parse_typescript_output, render_annotations, summarize,
    Annotation,
};
use scout_lint::{apply_fixes, Diagnostic, Linter, ToolRunner, ToolSettings};

use crate::config::CiConfig;
use crate::error::CiResult;
use crate::executor::{CommandExecutor, DryRunExecutor, ProcessExecutor};
use crate::operations::{OperationArgs, OperationContext, OperationTable};
use crate::secret::Secret;

#[derive(Debug, Parser)]
#[command(name = "scout-ci", version, about = "CI operations, annotations and custom lint rules")]
pub struct Cli {
    /// Configuration file (defaults to ./scout-ci.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a named operation
    Run {
        operation: String,
        #[arg(long, default_value = ".")]
        source: PathBuf,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        git_sha: Option<String>,
        #[arg(long)]
        package: Option<String>,
        /// Environment variable holding the registry token
        #[arg(long, default_value = "REGISTRY_TOKEN")]
        registry_token_env: String,
        /// Print the steps instead of running them
        #[arg(long)]
        dry_run: bool,
    },
    /// List available operations
    List,
    /// Convert tool output on stdin to annotation lines
    Annotate {
        #[arg(long, value_enum)]
        format: InputFormat,
        /// Make reported paths relative to this directory (ESLint only)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Lint one file from its ESTree JSON
    Lint {
        #[arg(long)]
        ast: PathBuf,
        #[arg(long)]
        source: PathBuf,
        /// Name reported in diagnostics (defaults to --source)
        #[arg(long)]
        file_name: Option<String>,
        /// Project root to run knip and jscpd in
        #[arg(long)]
        project: Option<PathBuf>,
        /// Write fixes back to --source
        #[arg(long)]
        fix: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Eslint,
    Typescript,
    StackTrace,
    Rust,
    CargoJson,
    CargoFmt,
    CargoTest,
}

/// Whether the command's findings should fail the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

/// Parse `input` in the given format
pub fn annotate(format: InputFormat, input: &str, root: Option<&Path>) -> CiResult<Vec<Annotation>> {
    Ok(match format {
        InputFormat::Eslint => parse_eslint_json(input, root)?,
        InputFormat::Typescript => parse_typescript_output(input),
        InputFormat::StackTrace => parse_stack_trace(input),
        InputFormat::Rust => parse_rust_output(input),
        InputFormat::CargoJson => parse_cargo_json(input),
        InputFormat::CargoFmt => parse_cargo_fmt_output(input),
        InputFormat::CargoTest => parse_cargo_test_output(input),
    })
}

/// Lint `source` using the AST in `ast_json`
///
/// With a `project` root the knip and jscpd backed rules run as well.
pub async fn lint(
    config: &CiConfig,
    file_name: &str,
    source: &str,
    ast_json: &str,
    project: Option<&Path>,
) -> CiResult<Vec<Diagnostic>> {
    let lint_config = config.lint.to_lint_config()?;
    let linter = match project {
        Some(root) => {
            let runner = ToolRunner::new(ToolSettings::from(&config.tools));
            let (knip, jscpd) = futures::try_join!(runner.knip(root), runner.jscpd(root))?;
            Linter::with_project_reports(lint_config, root.to_string_lossy(), knip, jscpd)
        }
        None => Linter::with_builtin_rules(lint_config),
    };
    Ok(linter.lint_source(file_name, source, ast_json)?)
}

fn write_annotations<W: Write>(out: &mut W, annotations: &[Annotation]) -> CiResult<Outcome> {
    out.write_all(render_annotations(annotations).as_bytes())?;
    let summary = summarize(annotations);
    info!(%summary, "Annotations written");
    Ok(if summary.has_errors() { Outcome::Failed } else { Outcome::Passed })
}

/// Execute a parsed command line, writing results to `out`
pub async fn execute<W: Write>(cli: Cli, out: &mut W) -> CiResult<Outcome> {
    let config = CiConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            operation,
            source,
            version,
            git_sha,
            package,
            registry_token_env,
            dry_run,
        } => {
            let executor: Arc<dyn CommandExecutor> = if dry_run {
                Arc::new(DryRunExecutor::new())
            } else {
                Arc::new(ProcessExecutor::new(config.step_timeout()))
            };
            let args = OperationArgs {
                source,
                version,
                git_sha,
                registry_token: std::env::var(&registry_token_env)
                    .ok()
                    .filter(|token| !token.is_empty())
                    .map(Secret::new),
                package,
            };
            let ctx = OperationContext::new(Arc::new(config), executor);

            let output = OperationTable::builtin().run(&operation, &ctx, &args).await?;
            writeln!(out, "{output}")?;
            Ok(Outcome::Passed)
        }
        Command::List => {
            for operation in OperationTable::builtin().iter() {
                writeln!(out, "{:<26}{}", operation.name, operation.description)?;
            }
            Ok(Outcome::Passed)
        }
        Command::Annotate { format, root } => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            let annotations = annotate(format, &input, root.as_deref())?;
            write_annotations(out, &annotations)
        }
        Command::Lint {
            ast,
            source,
            file_name,
            project,
            fix,
        } => {
            let ast_json = tokio::fs::read_to_string(&ast).await?;
            let text = tokio::fs::read_to_string(&source).await?;
            let file_name = file_name.unwrap_or_else(|| source.to_string_lossy().into_owned());

            let diagnostics = lint(&config, &file_name, &text, &ast_json, project.as_deref()).await?;
            if fix {
                let outcome = apply_fixes(&text, diagnostics.iter().filter_map(|d| d.fix.as_ref()));
                if outcome.applied > 0 {
                    tokio::fs::write(&source, &outcome.output).await?;
                    info!(applied = outcome.applied, file = %source.display(), "Fixes written");
                }
                if outcome.skipped > 0 {
                    warn!(skipped = outcome.skipped, "Overlapping fixes skipped");
                }
            }

            let annotations: Vec<Annotation> = diagnostics.iter().map(Annotation::from).collect();
            write_annotations(out, &annotations)
        }
    }
}
