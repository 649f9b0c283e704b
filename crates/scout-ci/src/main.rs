//! scout-ci entry point
//!
//! ```bash
//! scout-ci run ci --version 1.4.0 --git-sha "$GITHUB_SHA"
//! tsc --noEmit | scout-ci annotate --format typescript
//! ```
//!
//! Results go to stdout, logs to stderr.

use clap::Parser;
use scout_ci::{execute, Cli, Outcome};
use scout_common::{try_init_tracing_with_config, TracingConfig};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = try_init_tracing_with_config(TracingConfig::cli(cli.verbose)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let mut stdout = std::io::stdout().lock();
    match execute(cli, &mut stdout).await {
        Ok(Outcome::Passed) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "scout-ci failed");
            ExitCode::FAILURE
        }
    }
}
