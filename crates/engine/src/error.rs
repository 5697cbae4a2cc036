//! Error taxonomy for the orchestration engine, grouped the way the spec's
//! error-handling design separates configuration, transient-runtime,
//! state-collision, unrecoverable-I/O, and user-interrupt failures.

use sbx_containers::ContainerError;
use sbx_core::ConfigError;
use thiserror::Error;

/// Errors raised while building the initial or dynamically-routed task set.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no matching compiler for {0}, skipping")]
    CompilerMismatch(String),
    #[error("tool {0} does not support mode {1}")]
    ModeMismatch(String, String),
    #[error("failed to collect input files: {0}")]
    FileCollection(String),
}

/// Errors raised while routing findings to follow-up tools.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while executing a single task end to end.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("state collision: result directory already claimed: {0}")]
    Collision(String),
    #[error("i/o error writing artifact: {0}")]
    Io(String),
    #[error("task retries exhausted after {0} attempts")]
    RetriesExhausted(u32),
}

/// Errors raised while re-parsing a previously-run result directory.
#[derive(Debug, Error)]
pub enum ReparseError {
    #[error("task log not found in {0}")]
    MissingTaskLog(String),
    #[error("could not clear previous parse output in {0}")]
    StaleOutput(String),
    #[error("i/o error: {0}")]
    Io(String),
    #[error("malformed task log: {0}")]
    Json(String),
}

/// Top-level engine error composing the above, plus run-level failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("route error: {0}")]
    Route(#[from] RouteError),
    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
    #[error("reparse error: {0}")]
    Reparse(#[from] ReparseError),
    #[error("interrupted by {0}")]
    Interrupted(&'static str),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
