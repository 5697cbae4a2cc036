//! `TaskExecutor`: runs one [`Task`] end to end — early-exit on a cached
//! success, retries the container run against transient failures, writes the
//! task log artifact, and hands the result to the parser.

use crate::error::ExecuteError;
use sbx_containers::{ContainerEngine, ContainerRunner};
use sbx_core::{Clock, SystemClock, Task, TaskLog};
use sbx_parsers::{ParseInput, ParserRegistry};
use sbx_storage::artifacts::{self, ArtifactPaths};
use std::time::Duration;
use tracing::{error, info, warn};

/// Number of attempts before a task's container failures are treated as fatal.
const MAX_ATTEMPTS: u32 = 3;
/// Delay between retries, matching the original analyzer's fixed backoff.
const RETRY_DELAY: Duration = Duration::from_secs(15);

/// Outcome of executing one task.
#[derive(Debug)]
pub struct TaskResult {
    pub task_log: TaskLog,
    pub findings: Vec<sbx_core::Finding>,
    pub skipped: bool,
}

pub struct TaskExecutor<E: ContainerEngine, C: Clock = SystemClock> {
    runner: ContainerRunner<E>,
    parsers: ParserRegistry,
    clock: C,
}

impl<E: ContainerEngine> TaskExecutor<E, SystemClock> {
    pub fn new(runner: ContainerRunner<E>, parsers: ParserRegistry) -> Self {
        Self::with_clock(runner, parsers, SystemClock)
    }
}

impl<E: ContainerEngine, C: Clock> TaskExecutor<E, C> {
    pub fn with_clock(runner: ContainerRunner<E>, parsers: ParserRegistry, clock: C) -> Self {
        Self { runner, parsers, clock }
    }

    /// Best-effort cleanup of any containers left over from this run,
    /// called when the scheduler is interrupted mid-flight.
    pub async fn cleanup_containers(&self, runid: Option<&str>) {
        if let Err(e) = self.runner.cleanup(runid).await {
            warn!(error = %e, "failed to clean up containers after interrupt");
        }
    }

    /// Executes `task`, retrying transient container errors up to
    /// [`MAX_ATTEMPTS`] times with a fixed delay between attempts.
    pub async fn execute(&self, task: &Task) -> Result<TaskResult, ExecuteError> {
        let paths = ArtifactPaths::new(&task.rdir);

        if !task.settings.overwrite {
            if let Some(previous) = artifacts::read_task_log(&paths) {
                if previous.tool == task.tool.id.as_str()
                    && previous.relfn == task.relfn.display().to_string()
                    && previous.tool_args == task.tool_args
                {
                    info!(task_id = %task.id, "skipping, already completed");
                    return Ok(TaskResult {
                        task_log: previous,
                        findings: Vec::new(),
                        skipped: true,
                    });
                }
            }
        }

        artifacts::clear_previous_outputs(&paths).map_err(|e| ExecuteError::Io(e.to_string()))?;

        let start_ms = self.clock.epoch_ms();
        let mut last_err = None;
        let mut outcome = None;
        for attempt in 1..=MAX_ATTEMPTS {
            info!(task_id = %task.id, attempt, "running container");
            match self.runner.run(task).await {
                Ok(result) => {
                    outcome = Some(result);
                    break;
                }
                Err(e) => {
                    error!(task_id = %task.id, attempt, error = %e, "container run failed");
                    last_err = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        warn!("sleeping {}s before retry", RETRY_DELAY.as_secs());
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                return Err(ExecuteError::Container(
                    last_err.unwrap_or(sbx_containers::ContainerError::Runtime(
                        "retries exhausted".to_string(),
                    )),
                ))
            }
        };

        let end_ms = self.clock.epoch_ms();
        let start = chrono::DateTime::from_timestamp_millis(start_ms as i64)
            .unwrap_or_default()
            .to_rfc3339();
        let duration = (end_ms.saturating_sub(start_ms)) as f64 / 1000.0;

        let task_log = TaskLog {
            absfn: task.absfn.display().to_string(),
            relfn: task.relfn.display().to_string(),
            tool: task.tool.id.to_string(),
            tool_args: task.tool_args.clone(),
            start,
            duration,
            exit_code: outcome.exit_code,
            runid: task.settings.runid.clone(),
        };

        artifacts::write_task_log(&paths, &task_log).map_err(|e| ExecuteError::Io(e.to_string()))?;

        // Guards against two differently-routed tasks resolving to the same
        // result directory and racing each other's writes.
        if let Some(written) = artifacts::read_task_log(&paths) {
            if written.relfn != task_log.relfn || written.tool != task_log.tool {
                return Err(ExecuteError::Collision(task.rdir.display().to_string()));
            }
        }

        if !outcome.log.is_empty() {
            artifacts::write_tool_log(&paths, &outcome.log).map_err(|e| ExecuteError::Io(e.to_string()))?;
        }
        if let Some(tar) = &outcome.output_tar {
            artifacts::write_tool_output(&paths, tar).map_err(|e| ExecuteError::Io(e.to_string()))?;
        }

        let parser = self.parsers.get(&task.tool.parser);
        let parsed = parser.parse(&ParseInput {
            exit_code: outcome.exit_code,
            log: &outcome.log,
            tool_args: task.tool_args.split_whitespace().map(str::to_string).collect(),
            output_tar: outcome.output_tar.as_deref(),
        });

        if task.settings.json || task.settings.sarif {
            artifacts::write_parsed_output(&paths, &parsed)
                .map_err(|e| ExecuteError::Io(e.to_string()))?;
        }
        if task.settings.sarif {
            let sarif = sbx_storage::to_sarif(task.tool.id.as_str(), &parsed);
            artifacts::write_sarif(&paths, &sarif).map_err(|e| ExecuteError::Io(e.to_string()))?;
        }

        Ok(TaskResult {
            task_log,
            findings: parsed.findings,
            skipped: false,
        })
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
