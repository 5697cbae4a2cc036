//! Per-task result artifacts on disk.
//!
//! Each task owns a result directory (`task.rdir`) holding up to five files:
//! the task log, the raw tool log, the tool's output tar, the normalized
//! parser output, and an optional SARIF conversion. Writes go through a
//! temp-file-then-rename so a crash mid-write never leaves a half-written
//! artifact behind.

use sbx_core::{ParsedOutput, TaskLog};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TASK_LOG: &str = "smartbugs.json";
pub const TOOL_LOG: &str = "result.log";
pub const TOOL_OUTPUT: &str = "result.tar";
pub const PARSER_OUTPUT: &str = "result.json";
pub const SARIF_OUTPUT: &str = "result.sarif";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolved artifact paths for a task's result directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub task_log: PathBuf,
    pub tool_log: PathBuf,
    pub tool_output: PathBuf,
    pub parser_output: PathBuf,
    pub sarif_output: PathBuf,
}

impl ArtifactPaths {
    pub fn new(rdir: &Path) -> Self {
        Self {
            task_log: rdir.join(TASK_LOG),
            tool_log: rdir.join(TOOL_LOG),
            tool_output: rdir.join(TOOL_OUTPUT),
            parser_output: rdir.join(PARSER_OUTPUT),
            sarif_output: rdir.join(SARIF_OUTPUT),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn read_task_log(paths: &ArtifactPaths) -> Option<TaskLog> {
    let file = File::open(&paths.task_log).ok()?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).ok()
}

pub fn write_task_log(paths: &ArtifactPaths, log: &TaskLog) -> Result<(), ArtifactError> {
    let bytes = serde_json::to_vec_pretty(log)?;
    write_atomic(&paths.task_log, &bytes)
}

pub fn write_tool_log(paths: &ArtifactPaths, log: &str) -> Result<(), ArtifactError> {
    write_atomic(&paths.tool_log, log.as_bytes())
}

pub fn write_tool_output(paths: &ArtifactPaths, tar_bytes: &[u8]) -> Result<(), ArtifactError> {
    write_atomic(&paths.tool_output, tar_bytes)
}

pub fn write_parsed_output(paths: &ArtifactPaths, output: &ParsedOutput) -> Result<(), ArtifactError> {
    let bytes = serde_json::to_vec_pretty(output)?;
    write_atomic(&paths.parser_output, &bytes)
}

pub fn write_sarif(paths: &ArtifactPaths, sarif: &serde_json::Value) -> Result<(), ArtifactError> {
    let bytes = serde_json::to_vec_pretty(sarif)?;
    write_atomic(&paths.sarif_output, &bytes)
}

/// Removes any artifacts left over from a previous run of this task, so a
/// re-run never mixes stale output with a fresh one.
pub fn clear_previous_outputs(paths: &ArtifactPaths) -> Result<(), ArtifactError> {
    for path in [
        &paths.task_log,
        &paths.tool_log,
        &paths.tool_output,
        &paths.parser_output,
        &paths.sarif_output,
    ] {
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
