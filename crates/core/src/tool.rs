//! Tool descriptors: the static configuration for an analysis tool's container.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Execution mode a tool operates in, selected per input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Solidity,
    Bytecode,
    Runtime,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Solidity => "solidity",
            ExecutionMode::Bytecode => "bytecode",
            ExecutionMode::Runtime => "runtime",
        }
    }
}

crate::define_id! {
    /// Canonical identifier for a tool configuration, e.g. `"slither"` or `"echidna"`.
    pub struct ToolId;
}

/// Static, per-tool configuration loaded once from its config file.
///
/// Invariant: at least one of `command`/`entrypoint` must be `Some`, and
/// `image` must be non-empty. Violating either is a [`crate::error::ConfigError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub id: ToolId,
    pub mode: ExecutionMode,
    pub image: String,
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    pub parser: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub bin: Option<PathBuf>,
    #[serde(default)]
    pub default_params: Option<String>,
    #[serde(default)]
    pub solc: bool,
    #[serde(default)]
    pub cpu_quota: Option<u32>,
    #[serde(default)]
    pub mem_limit: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub entrypoint: Option<String>,
}

impl ToolConfig {
    /// Validates the invariant that at least one of command/entrypoint is set.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        if self.image.trim().is_empty() {
            return Err(crate::error::ConfigError::MissingImage(self.id.to_string()));
        }
        if self.command.is_none() && self.entrypoint.is_none() {
            return Err(crate::error::ConfigError::MissingCommand(
                self.id.to_string(),
            ));
        }
        Ok(())
    }

    /// The base tool name with any mode/variant suffix stripped, used as the
    /// left-hand side of a tool key (`"<baseTool>|<args>"`).
    pub fn base_tool(&self) -> &str {
        self.id.as_str().split('_').next().unwrap_or(self.id.as_str())
    }
}

/// Roster of tools run on every input file regardless of dynamic routing,
/// each paired with its default arguments and an optional timeout preset label.
pub const CORE_TOOLS: &[(&str, &str, Option<&str>)] = &[
    ("slither", "", None),
    ("smartcheck", "", None),
    ("mythril", "", Some("normal")),
    ("solhint", "", None),
    ("maian", "", Some("maian")),
    ("confuzzius", "", Some("confuzzius_core")),
];

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
