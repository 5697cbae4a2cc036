//! Shared, cross-crate error types for the data model layer.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::tool::ToolConfig`] or
/// rendering its command/entrypoint templates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tool {0}: image is required")]
    MissingImage(String),
    #[error("tool {0}: at least one of command/entrypoint is required")]
    MissingCommand(String),
    #[error("tool {0}: unknown template placeholder ${1}")]
    UnknownPlaceholder(String, String),
    #[error("tool {0}: invalid mem_limit {1:?}, expected a number with k/m/g suffix")]
    InvalidMemLimit(String, String),
    #[error("tool {0}: alias target {1} not found")]
    UnknownAlias(String, String),
    #[error("failed to read tool configuration at {0}: {1}")]
    Io(String, String),
    #[error("failed to parse tool configuration at {0}: {1}")]
    Parse(String, String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
