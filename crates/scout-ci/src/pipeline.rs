//! Sequential stages and fail-fast fan-out

use futures::future::try_join_all;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::error::{CiError, CiResult};
use crate::executor::{CommandExecutor, Step, StepOutput};

/// Lines of stderr kept in [`CiError::StepFailed`]
const STDERR_TAIL_LINES: usize = 20;

/// Named list of steps run one after another
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// Drives steps through a [`CommandExecutor`]
#[derive(Clone, Copy)]
pub struct Pipeline<'e> {
    executor: &'e dyn CommandExecutor,
}

impl<'e> Pipeline<'e> {
    pub fn new(executor: &'e dyn CommandExecutor) -> Self {
        Self { executor }
    }

    /// Run one step; a non-zero exit becomes [`CiError::StepFailed`]
    pub async fn run_step(&self, step: &Step) -> CiResult<StepOutput> {
        let output = self.executor.execute(step).await?;
        if output.success() {
            info!(step = %step.name, elapsed_ms = output.elapsed.as_millis() as u64, "Step passed");
            return Ok(output);
        }

        error!(
            step = %step.name,
            code = ?output.code,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "Step failed"
        );
        Err(CiError::StepFailed {
            step: step.name.clone(),
            code: output.code,
            stderr_tail: tail(&output.stderr, STDERR_TAIL_LINES),
        })
    }

    /// Run a stage's steps in order, stopping at the first failure
    #[instrument(skip(self, stage), fields(stage = %stage.name))]
    pub async fn run_stage(&self, stage: &Stage) -> CiResult<Vec<StepOutput>> {
        let started = Instant::now();
        let mut outputs = Vec::with_capacity(stage.steps.len());
        for step in &stage.steps {
            match self.run_step(step).await {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    error!(elapsed_ms = started.elapsed().as_millis() as u64, "Stage aborted");
                    return Err(e);
                }
            }
        }
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Stage passed");
        Ok(outputs)
    }

    /// Run independent stages concurrently
    ///
    /// The first failure drops the remaining stages (their processes are
    /// killed) and is returned.
    pub async fn fan_out(&self, stages: &[Stage]) -> CiResult<Vec<Vec<StepOutput>>> {
        let started = Instant::now();
        let result = try_join_all(stages.iter().map(|stage| self.run_stage(stage))).await;
        match &result {
            Ok(_) => info!(
                stages = stages.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Fan-out finished"
            ),
            Err(e) => error!(
                stages = stages.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "Fan-out aborted"
            ),
        }
        result
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::DryRunExecutor;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Fails any step whose name contains `fail`, after a delay for `slow`
    struct Scripted {
        dry: DryRunExecutor,
    }

    #[async_trait]
    impl CommandExecutor for Scripted {
        async fn execute(&self, step: &Step) -> CiResult<StepOutput> {
            if step.name.contains("slow") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.dry.execute(step).await?;
            let failed = step.name.contains("fail");
            Ok(StepOutput {
                code: Some(i32::from(failed)),
                stderr: if failed { "line 1\nline 2\n".to_string() } else { String::new() },
                ..StepOutput::default()
            })
        }
    }

    fn scripted() -> Scripted {
        Scripted { dry: DryRunExecutor::new() }
    }

    fn stage(name: &str, steps: &[&str]) -> Stage {
        steps
            .iter()
            .fold(Stage::new(name), |stage, step| stage.step(Step::new(*step, "true", ".")))
    }

    #[tokio::test]
    async fn test_stage_stops_at_first_failure() {
        let executor = scripted();
        let pipeline = Pipeline::new(&executor);

        let err = pipeline
            .run_stage(&stage("web", &["install", "fail lint", "build"]))
            .await
            .unwrap_err();
        match err {
            CiError::StepFailed { step, code, stderr_tail } => {
                assert_eq!(step, "fail lint");
                assert_eq!(code, Some(1));
                assert_eq!(stderr_tail, "line 1\nline 2");
            }
            other => panic!("unexpected error: {other}"),
        }
        let names: Vec<String> = executor.dry.executed().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["install", "fail lint"]);
    }

    #[tokio::test]
    async fn test_fan_out_collects_in_stage_order() {
        let executor = scripted();
        let outputs = Pipeline::new(&executor)
            .fan_out(&[stage("a", &["a1", "a2"]), stage("b", &["b1"])])
            .await
            .unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].len(), 2);
        assert_eq!(outputs[1].len(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_fails_fast() {
        let executor = scripted();
        let started = Instant::now();
        let err = Pipeline::new(&executor)
            .fan_out(&[stage("slow", &["slow build"]), stage("broken", &["fail check"])])
            .await
            .unwrap_err();

        assert!(matches!(err, CiError::StepFailed { ref step, .. } if step == "fail check"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
        assert_eq!(tail("", 5), "");
    }
}
