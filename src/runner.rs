use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::output;
use crate::steps::{Invocation, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    /// `code` is `None` when the process was terminated by a signal.
    Failed { code: Option<i32> },
}

impl From<ExitStatus> for StepStatus {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            StepStatus::Succeeded
        } else {
            StepStatus::Failed {
                code: status.code(),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{step} failed with {}", describe_code(.code))]
    StepFailed { step: Step, code: Option<i32> },
    #[error("{step} could not be launched: {source}")]
    Launch {
        step: Step,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn step(&self) -> Step {
        match self {
            PipelineError::StepFailed { step, .. } | PipelineError::Launch { step, .. } => *step,
        }
    }

    /// Process exit status for the driver: the step's own code when it fits, else 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::StepFailed {
                code: Some(c @ 1..=255),
                ..
            } => *c as u8,
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Seam between the sequencing logic and whatever actually executes a step.
pub trait StepRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<StepStatus, PipelineError>;
}

/// Runs each step as a child process with inherited stdio and waits for it.
pub struct ProcessRunner;

impl StepRunner for ProcessRunner {
    fn run(&mut self, inv: &Invocation) -> Result<StepStatus, PipelineError> {
        let status = Command::new(&inv.program)
            .args(&inv.args)
            .status()
            .map_err(|source| PipelineError::Launch {
                step: inv.step,
                source,
            })?;
        Ok(status.into())
    }
}

/// Run every invocation in order, stopping at the first failure.
/// Returns wall-clock time from just before the first step to just after the last.
pub fn run_pipeline<R: StepRunner>(
    runner: &mut R,
    invocations: &[Invocation],
) -> Result<Duration, PipelineError> {
    let total = invocations.len();
    let t0 = Instant::now();

    for inv in invocations {
        output::step_header(inv.step, total);
        debug!(step = inv.step.number(), command = %inv.command_line(), "launching");

        let t_step = Instant::now();
        match runner.run(inv) {
            Ok(StepStatus::Succeeded) => {
                let elapsed = t_step.elapsed();
                info!(
                    step = inv.step.number(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "step complete"
                );
                output::step_done(inv.step, elapsed);
            }
            Ok(StepStatus::Failed { code }) => {
                error!(step = inv.step.number(), ?code, "step failed, aborting pipeline");
                return Err(PipelineError::StepFailed {
                    step: inv.step,
                    code,
                });
            }
            Err(e) => {
                error!(step = inv.step.number(), error = %e, "step could not start");
                return Err(e);
            }
        }
    }

    Ok(t0.elapsed())
}
