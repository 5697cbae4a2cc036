//! `TaskPlanner`: builds the initial task batch (`collect_tasks`) and the
//! dynamic per-route task (`collect_single_task`).

use crate::compiler::{extract_pragma, CompilerResolver};
use crate::error::PlanError;
use sbx_core::{ExecutionMode, SharedState, Task, TaskId, ToolConfig, CORE_TOOLS};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// A discovered input file: absolute path plus the relative path used for
/// display and template substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub absfn: PathBuf,
    pub relfn: PathBuf,
}

/// Walks `patterns` (glob patterns, optionally rooted) and returns every
/// matching `.sol`/`.hex` file, deduplicated by absolute path.
pub fn collect_files(patterns: &[(Option<PathBuf>, String)]) -> Result<Vec<InputFile>, PlanError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for (root, pattern) in patterns {
        let full_pattern = match root {
            Some(root) => root.join(pattern).to_string_lossy().to_string(),
            None => pattern.clone(),
        };
        let entries = glob::glob(&full_pattern)
            .map_err(|e| PlanError::FileCollection(e.to_string()))?;
        for entry in entries {
            let path = entry.map_err(|e| PlanError::FileCollection(e.to_string()))?;
            if !path.is_file() {
                continue;
            }
            let ext_ok = path
                .extension()
                .map(|e| e == "sol" || e == "hex")
                .unwrap_or(false);
            if !ext_ok {
                continue;
            }
            let absfn = std::fs::canonicalize(&path)
                .map_err(|e| PlanError::FileCollection(e.to_string()))?;
            if seen.insert(absfn.clone()) {
                let relfn = match root {
                    Some(root) => path.strip_prefix(root).unwrap_or(&path).to_path_buf(),
                    None => path.clone(),
                };
                files.push(InputFile { absfn, relfn });
            }
        }
    }
    files.sort_by(|a, b| a.absfn.cmp(&b.absfn));
    Ok(files)
}

/// Classifies an input file's execution mode from its extension, applying
/// the `.rt.` suffix / `settings.runtime` override for bytecode files.
pub fn classify_mode(absfn: &Path, force_runtime: bool) -> Option<ExecutionMode> {
    let name = absfn.file_name()?.to_string_lossy();
    if name.ends_with(".sol") {
        return Some(ExecutionMode::Solidity);
    }
    if name.ends_with(".hex") {
        let is_rt = name.ends_with(".rt.hex") || force_runtime;
        return Some(if is_rt {
            ExecutionMode::Runtime
        } else {
            ExecutionMode::Bytecode
        });
    }
    None
}

/// Parses an argument string into `flag -> set of values`, treating
/// flag-only tokens as mapping to a single empty-string value. Used to check
/// whether a new argument set is a subset of one already scheduled.
pub fn parse_arg_map(arg_str: &str) -> HashMap<String, BTreeSet<String>> {
    let mut map: HashMap<String, BTreeSet<String>> = HashMap::new();
    let tokens: Vec<&str> = arg_str.split_whitespace().collect();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if !token.starts_with('-') {
            i += 1;
            continue;
        }
        let mut values = Vec::new();
        let prefix;
        if let Some((p, after)) = token.split_once('=') {
            prefix = p.to_string();
            if !after.is_empty() {
                values.push(after.to_string());
            }
            i += 1;
        } else {
            prefix = token.to_string();
            i += 1;
            while i < tokens.len() && !tokens[i].starts_with('-') {
                values.push(tokens[i].to_string());
                i += 1;
            }
        }
        let mut flat = Vec::new();
        for v in &values {
            for part in v.split(',') {
                let part = part.trim();
                if !part.is_empty() {
                    flat.push(part.to_string());
                }
            }
        }
        if flat.is_empty() {
            flat.push(String::new());
        }
        map.entry(prefix).or_default().extend(flat);
    }
    map
}

/// Resolves the `$TOOL/$MODE/$ABSDIR/$RELDIR/$FILENAME/$FILEBASE/$FILEEXT/$ARGS`
/// result-directory template against one (tool, file, args) combination.
pub fn resultdir(
    template: &str,
    tool: &ToolConfig,
    absfn: &Path,
    relfn: &Path,
    args: &str,
) -> PathBuf {
    let filename = relfn
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let filebase = relfn
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let fileext = relfn
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let reldir = relfn
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let absdir = absfn
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    let rendered = template
        .replace("$TOOL", tool.id.as_str())
        .replace("$MODE", tool.mode.as_str())
        .replace("$ABSDIR", &absdir)
        .replace("$RELDIR", &reldir)
        .replace("$FILENAME", &filename)
        .replace("$FILEBASE", &filebase)
        .replace("$FILEEXT", &fileext)
        .replace("$ARGS", args);
    PathBuf::from(rendered)
}

/// Disambiguates `rdir` against `used` by appending `_N` suffixes on collision.
pub fn disambiguate(base: PathBuf, used: &mut HashSet<PathBuf>) -> (PathBuf, bool) {
    if used.insert(base.clone()) {
        return (base, false);
    }
    let mut n = 2;
    loop {
        let candidate = PathBuf::from(format!("{}_{n}", base.display()));
        if used.insert(candidate.clone()) {
            return (candidate, true);
        }
        n += 1;
    }
}

/// Resolves a tool's fixed numeric timeout from its base name, if configured.
pub fn fixed_tool_timeout(base_tool: &str) -> Option<u64> {
    match base_tool {
        "maian" => Some(45),
        "confuzzius_core" => Some(50),
        _ => None,
    }
}

/// Builds the initial, full-roster task batch for every (file, tool) pair
/// whose mode matches the file.
pub struct TaskPlanner<R: CompilerResolver> {
    resolver: R,
    result_dir_template: String,
}

impl<R: CompilerResolver> TaskPlanner<R> {
    pub fn new(resolver: R, result_dir_template: impl Into<String>) -> Self {
        Self {
            resolver,
            result_dir_template: result_dir_template.into(),
        }
    }

    pub fn collect_tasks(
        &self,
        files: &[InputFile],
        tools: &[ToolConfig],
        settings: Arc<sbx_core::Settings>,
        state: &SharedState,
        force_runtime: bool,
    ) -> Vec<Task> {
        let mut used_rdirs = HashSet::new();
        let mut tasks = Vec::new();

        for file in files {
            let Some(mode) = classify_mode(&file.absfn, force_runtime) else {
                continue;
            };
            let pragma = if mode == ExecutionMode::Solidity {
                std::fs::read_to_string(&file.absfn)
                    .ok()
                    .and_then(|src| extract_pragma(&src))
            } else {
                None
            };

            let mut sorted_tools: Vec<&ToolConfig> = tools.iter().filter(|t| t.mode == mode).collect();
            sorted_tools.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

            for tool in sorted_tools {
                let base = resultdir(&self.result_dir_template, tool, &file.absfn, &file.relfn, "");
                let (rdir, _collided) = disambiguate(base, &mut used_rdirs);

                let (solc_version, solc_path) = if tool.solc {
                    match &pragma {
                        Some(pragma) => match self.resolver.resolve(pragma) {
                            Some((v, p)) => (Some(v), Some(p)),
                            None => {
                                warn!(file = %file.relfn.display(), tool = %tool.id, "no usable solc, skipping");
                                continue;
                            }
                        },
                        None => {
                            warn!(file = %file.relfn.display(), tool = %tool.id, "no pragma, skipping");
                            continue;
                        }
                    }
                } else {
                    (None, None)
                };

                let base_tool = tool.base_tool();
                let (args, timeout_label) = CORE_TOOLS
                    .iter()
                    .find(|(name, _, _)| *name == base_tool)
                    .map(|(_, args, label)| (*args, *label))
                    .unwrap_or(("", None));

                let mut timeout = settings.default_timeout;
                if timeout == 0 {
                    timeout = fixed_tool_timeout(base_tool).unwrap_or(0);
                }
                if timeout == 0 {
                    if let Some(label) = timeout_label {
                        timeout = crate::router::resolve_timeout_label(label).unwrap_or(0);
                    }
                }
                if let Some(base_boost) = settings.core_budget_timeout_base {
                    let core_bases: HashSet<&str> =
                        CORE_TOOLS.iter().map(|(name, _, _)| *name).collect();
                    if core_bases.contains(base_tool) {
                        timeout = timeout.max(base_boost);
                    }
                }

                state.try_claim_tool_key(&file.absfn, &format!("{base_tool}|"));

                tasks.push(Task {
                    id: TaskId::new(format!("task-{}", tasks.len() + 1)),
                    absfn: file.absfn.clone(),
                    relfn: file.relfn.clone(),
                    rdir,
                    tool: tool.clone(),
                    tool_args: args.to_string(),
                    timeout: Some(timeout),
                    solc_version,
                    solc_path,
                    settings: settings.clone(),
                });
            }
        }
        tasks
    }

    /// Builds a single dynamically-routed task, applying dedup/subsumption
    /// rules, or returns `Ok(None)` if the route should be skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn collect_single_task(
        &self,
        absfn: &Path,
        relfn: &Path,
        tool: &ToolConfig,
        settings: Arc<sbx_core::Settings>,
        state: &SharedState,
        tool_args: &str,
        timeout: Option<u64>,
        force_runtime: bool,
    ) -> Result<Option<Task>, PlanError> {
        let base_tool = tool.base_tool();
        let clean_args = tool_args.trim();
        let tool_key = format!("{base_tool}|{clean_args}");

        if state.has_tool_key(absfn, &tool_key) {
            return Ok(None);
        }

        let new_arg_map = parse_arg_map(clean_args);
        if !new_arg_map.is_empty() {
            let mut subset = true;
            for (flag, values) in &new_arg_map {
                let existing = state.arg_values(base_tool, flag);
                if !values.iter().all(|v| existing.contains(v)) {
                    subset = false;
                    break;
                }
            }
            if subset {
                return Ok(None);
            }
        }

        if settings.skip_after_no_args
            && state.has_tool_key(absfn, &format!("{base_tool}|"))
        {
            return Ok(None);
        }

        let Some(mode) = classify_mode(absfn, force_runtime) else {
            return Ok(None);
        };
        if mode != tool.mode {
            return Ok(None);
        }

        let (solc_version, solc_path) = if tool.solc {
            let pragma = std::fs::read_to_string(absfn)
                .ok()
                .and_then(|src| extract_pragma(&src));
            match pragma {
                Some(pragma) => match self.resolver.resolve(&pragma) {
                    Some((v, p)) => (Some(v), Some(p)),
                    None => {
                        warn!(file = %relfn.display(), tool = %tool.id, "no usable solc, skipping dynamic route");
                        return Ok(None);
                    }
                },
                None => {
                    warn!(file = %relfn.display(), tool = %tool.id, "no pragma, skipping dynamic route");
                    return Ok(None);
                }
            }
        } else {
            (None, None)
        };

        let effective_timeout = timeout
            .or(Some(settings.default_timeout).filter(|t| *t > 0))
            .or_else(|| fixed_tool_timeout(base_tool));

        for (flag, values) in &new_arg_map {
            for value in values {
                state.record_arg(base_tool, flag, value);
            }
        }
        state.try_claim_tool_key(absfn, &tool_key);
        state.push_scheduled_tool(base_tool);

        let rdir = resultdir(&self.result_dir_template, tool, absfn, relfn, clean_args);

        Ok(Some(Task {
            id: TaskId::new(format!("task-{tool_key}")),
            absfn: absfn.to_path_buf(),
            relfn: relfn.to_path_buf(),
            rdir,
            tool: tool.clone(),
            tool_args: clean_args.to_string(),
            timeout: effective_timeout,
            solc_version,
            solc_path,
            settings,
        }))
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
