//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::finding::{Category, Finding, ParsedOutput};
use crate::settings::Settings;
use crate::task::{Task, TaskId};
use crate::tool::{ExecutionMode, ToolConfig, ToolId};
use std::path::PathBuf;
use std::sync::Arc;

/// Builds a minimal, valid [`ToolConfig`] for tests.
pub fn tool_config(id: &str, mode: ExecutionMode) -> ToolConfig {
    ToolConfig {
        id: ToolId::new(id),
        mode,
        image: format!("smartbugs/{id}"),
        name: id.to_string(),
        origin: None,
        version: None,
        info: None,
        parser: id.to_string(),
        output: None,
        bin: None,
        default_params: None,
        solc: matches!(mode, ExecutionMode::Solidity),
        cpu_quota: None,
        mem_limit: None,
        command: Some("$BIN $FILENAME".to_string()),
        entrypoint: None,
    }
}

/// Builds a [`Task`] for a given tool/args against a fixed test input file.
pub fn task(tool_id: &str, args: &str, settings: Arc<Settings>) -> Task {
    Task {
        id: TaskId::new(format!("task-{tool_id}")),
        absfn: PathBuf::from("/contracts/Sample.sol"),
        relfn: PathBuf::from("Sample.sol"),
        rdir: PathBuf::from(format!("results/{tool_id}/Sample.sol")),
        tool: tool_config(tool_id, ExecutionMode::Solidity),
        tool_args: args.to_string(),
        timeout: None,
        solc_version: None,
        solc_path: None,
        settings,
    }
}

/// Builds a [`Finding`] with no location, for routing/dedup tests.
pub fn finding(category: Category, description: &str) -> Finding {
    Finding {
        category,
        description: description.to_string(),
        location: None,
    }
}

/// Builds a [`ParsedOutput`] with the given findings and no errors/fails.
pub fn parsed_output(parser: &str, findings: Vec<Finding>) -> ParsedOutput {
    ParsedOutput {
        parser: parser.to_string(),
        parser_version: "test".to_string(),
        tool_args: Vec::new(),
        findings,
        infos: Vec::new(),
        errors: Vec::new(),
        fails: Vec::new(),
    }
}

/// A default [`Settings`] for tests, wrapped in an `Arc` as production code expects.
pub fn settings() -> Arc<Settings> {
    Arc::new(Settings::default())
}
