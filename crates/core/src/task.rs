//! The unit of scheduled work: one (file, tool, args) analysis run.

use crate::settings::Settings;
use crate::tool::ToolConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

crate::define_id! {
    /// Opaque identifier assigned to a [`Task`] at construction, used in logs
    /// and container labels; not persisted to the task log artifact itself.
    pub struct TaskId;
}

/// One unit of work: run `tool` against `absfn`, writing results under `rdir`.
///
/// Constructed by `TaskPlanner` (initial batch) or by the `Router` via
/// `collect_single_task` (dynamically routed follow-ups). Immutable after
/// it is enqueued; dropped once the executor finishes with it.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub absfn: PathBuf,
    pub relfn: PathBuf,
    pub rdir: PathBuf,
    pub tool: ToolConfig,
    pub tool_args: String,
    pub timeout: Option<u64>,
    pub solc_version: Option<String>,
    pub solc_path: Option<PathBuf>,
    pub settings: Arc<Settings>,
}

impl Task {
    /// The dedup key used by `Settings::tool_keys`: `"<baseTool>|<args>"`.
    pub fn tool_key(&self) -> String {
        format!("{}|{}", self.tool.base_tool(), self.tool_args)
    }

    /// Resolves the effective timeout in seconds: the task's own override,
    /// else the run-wide default from settings.
    pub fn effective_timeout(&self) -> u64 {
        self.timeout.unwrap_or(self.settings.default_timeout)
    }
}

/// Serializable snapshot of a task's identity and result, written as part of
/// the `TaskLog` artifact (`smartbugs.json`) once execution completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLog {
    pub absfn: String,
    pub relfn: String,
    pub tool: String,
    pub tool_args: String,
    pub start: String,
    pub duration: f64,
    pub exit_code: Option<i32>,
    pub runid: String,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
