//! `ContainerRunner`: stages a task's workdir, runs its container, and
//! extracts the result artifact — the part of a task execution that talks to
//! the container runtime, kept separate from task bookkeeping (that lives in
//! the `engine` crate's `TaskExecutor`).

use crate::engine::{ContainerEngine, ContainerError, ContainerSpec, WaitOutcome};
use crate::template::{render, split_argv, TemplateContext};
use sbx_core::{ExecutionMode, Task};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Grace period given to a container after a timeout before force-killing it.
const STOP_GRACE_SECS: u64 = 10;

/// Stages the task's input file (and any tool overlays) into a fresh workdir,
/// runs the container to completion, and returns the wait outcome.
pub struct ContainerRunner<E: ContainerEngine> {
    engine: E,
    work_root: PathBuf,
}

impl<E: ContainerEngine> ContainerRunner<E> {
    pub fn new(engine: E, work_root: PathBuf) -> Self {
        Self { engine, work_root }
    }

    /// Removes any containers left running from a previous or interrupted
    /// run, scoped to `runid` when given.
    pub async fn cleanup(&self, runid: Option<&str>) -> Result<usize, ContainerError> {
        self.engine.cleanup(runid).await
    }

    /// Runs `task`'s container end to end: stage workdir, pull image, spawn,
    /// wait with `task.effective_timeout()`, and on timeout/connection error
    /// fall back to a graceful stop with a 10-second grace, then clean up.
    pub async fn run(&self, task: &Task) -> Result<WaitOutcome, ContainerError> {
        let workdir = self.stage_workdir(task)?;
        self.engine.ensure_image(&task.tool.image).await?;

        let spec = self.build_spec(task, &workdir)?;
        let handle = self.engine.spawn(spec).await?;

        let timeout = task.effective_timeout();
        let outcome = match self.engine.wait(&handle, timeout).await {
            Ok(outcome) => Ok(outcome),
            Err(ContainerError::Timeout(_)) | Err(ContainerError::Connection(_)) => {
                warn!(task_id = %task.id, "container wait timed out, attempting graceful stop");
                self.engine.stop(&handle, STOP_GRACE_SECS).await.ok();
                self.engine.wait(&handle, STOP_GRACE_SECS).await
            }
            Err(other) => Err(other),
        };

        if let Err(e) = self.engine.remove(&handle).await {
            warn!(task_id = %task.id, error = %e, "failed to remove container after run");
        }
        let _ = fs::remove_dir_all(&workdir);

        outcome
    }

    fn build_spec(&self, task: &Task, workdir: &Path) -> Result<ContainerSpec, ContainerError> {
        let ctx = TemplateContext {
            filename: task.relfn.display().to_string(),
            timeout: task.effective_timeout().to_string(),
            bin: "/sb/bin".to_string(),
            main: task
                .relfn
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            args: task.tool_args.clone(),
        };

        let command = task
            .tool
            .command
            .as_deref()
            .map(|tmpl| render(task.tool.id.as_str(), tmpl, &ctx))
            .transpose()
            .map_err(|e| ContainerError::Runtime(e.to_string()))?
            .map(|rendered| split_argv(&rendered));

        let entrypoint = task
            .tool
            .entrypoint
            .as_deref()
            .map(|tmpl| render(task.tool.id.as_str(), tmpl, &ctx))
            .transpose()
            .map_err(|e| ContainerError::Runtime(e.to_string()))?
            .map(|rendered| split_argv(&rendered));

        let mut labels = HashMap::new();
        labels.insert("smartbugs".to_string(), "1".to_string());
        labels.insert("runid".to_string(), task.settings.runid.clone());
        labels.insert("tool".to_string(), task.tool.id.to_string());
        labels.insert("mode".to_string(), task.tool.mode.as_str().to_string());
        labels.insert("file".to_string(), task.relfn.display().to_string());

        Ok(ContainerSpec {
            image: task.tool.image.clone(),
            command,
            entrypoint,
            workdir: workdir.to_path_buf(),
            cpu_quota: task.tool.cpu_quota,
            mem_limit: task.tool.mem_limit.clone(),
            labels,
        })
    }

    /// Prepares a per-task workdir: copies the input file (hex-sanitized for
    /// bytecode/runtime mode), optionally overlays the tool's local `bin/`
    /// directory, and copies a resolved `solc` binary in as `bin/solc`.
    fn stage_workdir(&self, task: &Task) -> Result<PathBuf, ContainerError> {
        let workdir = self.work_root.join(task.id.as_str());
        fs::create_dir_all(&workdir).map_err(|e| ContainerError::Io(e.to_string()))?;

        let dest = workdir.join(&task.relfn);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ContainerError::Io(e.to_string()))?;
        }

        match task.tool.mode {
            ExecutionMode::Solidity => {
                fs::copy(&task.absfn, &dest).map_err(|e| ContainerError::Io(e.to_string()))?;
            }
            ExecutionMode::Bytecode | ExecutionMode::Runtime => {
                let raw = fs::read_to_string(&task.absfn)
                    .map_err(|e| ContainerError::Io(e.to_string()))?;
                let sanitized = sanitize_hex(&raw);
                fs::write(&dest, sanitized).map_err(|e| ContainerError::Io(e.to_string()))?;
            }
        }

        if let Some(bin_dir) = &task.tool.bin {
            if bin_dir.is_dir() {
                copy_dir(bin_dir, &workdir.join("bin"))
                    .map_err(|e| ContainerError::Io(e.to_string()))?;
            }
        }

        if let Some(solc_path) = &task.solc_path {
            let bin_dir = workdir.join("bin");
            fs::create_dir_all(&bin_dir).map_err(|e| ContainerError::Io(e.to_string()))?;
            fs::copy(solc_path, bin_dir.join("solc")).map_err(|e| ContainerError::Io(e.to_string()))?;
        }

        info!(task_id = %task.id, workdir = %workdir.display(), "staged task workdir");
        Ok(workdir)
    }
}

/// Strips a leading `0x`/`0X` prefix from a hex bytecode file's contents.
fn sanitize_hex(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_string()
}

fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dest_path = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest_path)?;
        } else {
            fs::copy(entry.path(), dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
