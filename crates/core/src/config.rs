//! Loads tool configurations from `tools/<id>/config.yaml` files on disk.
//!
//! A config entry is one of three shapes: a full [`ToolConfig`], a delegate
//! (`alias: <other-id>`) that copies another tool's definition under a new
//! id, or a named roster (`alias: [id, id, …]`) such as the `all` entry used
//! to size the coverage set for the budget phase.

use crate::error::ConfigError;
use crate::tool::{ToolConfig, ToolId};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Alias { alias: AliasValue },
    Full(Box<ToolConfig>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AliasValue {
    Delegate(String),
    Roster(Vec<String>),
}

#[derive(Debug, Clone)]
enum ToolEntry {
    Config(ToolConfig),
    Delegate(String),
    Roster(Vec<String>),
}

fn parse_entry(id: &str, yaml: &str) -> Result<ToolEntry, ConfigError> {
    let raw: RawEntry =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(id.to_string(), e.to_string()))?;
    Ok(match raw {
        RawEntry::Alias { alias: AliasValue::Delegate(other) } => ToolEntry::Delegate(other),
        RawEntry::Alias { alias: AliasValue::Roster(list) } => ToolEntry::Roster(list),
        RawEntry::Full(cfg) => ToolEntry::Config(*cfg),
    })
}

/// Loads every `tools/<id>/config.yaml` under `tools_dir`, resolving
/// delegate entries against already-loaded base tools.
///
/// Returns the tool registry keyed by id, plus the roster named `all` (the
/// coverage tool list consulted by the budget phase), if present.
pub fn load_tool_registry(tools_dir: &Path) -> Result<(HashMap<String, ToolConfig>, Vec<String>), ConfigError> {
    let mut configs = HashMap::new();
    let mut delegates = Vec::new();
    let mut roster = Vec::new();

    let entries = fs::read_dir(tools_dir)
        .map_err(|e| ConfigError::Io(tools_dir.display().to_string(), e.to_string()))?;
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let id = dir.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        let config_path = dir.join("config.yaml");
        let Ok(yaml) = fs::read_to_string(&config_path) else {
            continue;
        };
        match parse_entry(&id, &yaml)? {
            ToolEntry::Config(cfg) => {
                configs.insert(id, cfg);
            }
            ToolEntry::Delegate(base) => delegates.push((id, base)),
            ToolEntry::Roster(list) => {
                if id == "all" {
                    roster = list;
                }
            }
        }
    }

    for (id, base) in delegates {
        let base_cfg = configs
            .get(&base)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAlias(id.clone(), base.clone()))?;
        let mut cfg = base_cfg;
        cfg.id = ToolId::new(id.clone());
        configs.insert(id, cfg);
    }

    for cfg in configs.values() {
        cfg.validate()?;
    }

    Ok((configs, roster))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
