//! Run-global configuration and the shared, serialized-access accounting state.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Immutable run configuration, frozen once the run starts.
///
/// Every field here is read-mostly: set once from CLI flags / config file and
/// never mutated again. Mutable bookkeeping lives in [`SharedState`] instead,
/// which is passed around as an `Arc` so it is never a process-wide global.
#[derive(Debug, Clone)]
pub struct Settings {
    pub processes: usize,
    pub runid: String,
    pub default_timeout: u64,
    pub dynamic: bool,
    pub skip_after_no_args: bool,
    pub quiet: bool,
    pub overwrite: bool,
    pub json: bool,
    pub sarif: bool,
    pub time_budget: Option<u64>,
    pub fuzz_mode: Option<String>,
    pub core_budget_timeout_base: Option<u64>,
    pub results_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            processes: 1,
            runid: "run".to_string(),
            default_timeout: 500,
            dynamic: true,
            skip_after_no_args: false,
            quiet: false,
            overwrite: false,
            json: true,
            sarif: false,
            time_budget: None,
            fuzz_mode: None,
            core_budget_timeout_base: None,
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Mutable, serialized-access accounting shared across scheduler workers.
///
/// Every field is guarded by its own [`parking_lot::Mutex`] rather than one
/// coarse lock, matching the original analyzer's per-structure locking so
/// unrelated bookkeeping (dedup keys vs. arg history) never contends.
#[derive(Debug, Default)]
pub struct SharedState {
    /// `absfn -> set of tool keys already scheduled for that file`.
    tool_keys: Mutex<HashMap<PathBuf, HashSet<String>>>,
    /// `baseTool -> flag -> set of values seen across all scheduled invocations`.
    tool_arg_history: Mutex<HashMap<String, HashMap<String, HashSet<String>>>>,
    /// Base tool ids scheduled so far, in scheduling order.
    scheduled_tools: Mutex<Vec<String>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records the key if `(absfn, tool_key)` has not been
    /// seen before; returns false if it is a duplicate.
    pub fn try_claim_tool_key(&self, absfn: &Path, tool_key: &str) -> bool {
        let mut keys = self.tool_keys.lock();
        let entry = keys.entry(absfn.to_path_buf()).or_default();
        entry.insert(tool_key.to_string())
    }

    pub fn has_tool_key(&self, absfn: &Path, tool_key: &str) -> bool {
        self.tool_keys
            .lock()
            .get(absfn)
            .map(|set| set.contains(tool_key))
            .unwrap_or(false)
    }

    pub fn tool_keys_for(&self, absfn: &Path) -> HashSet<String> {
        self.tool_keys.lock().get(absfn).cloned().unwrap_or_default()
    }

    /// Records that `base_tool` was invoked with `flag=value`, for subsumption
    /// checks ("no-args-wins": a flag already scheduled with an empty value
    /// set subsumes any later scheduling with a non-empty one).
    pub fn record_arg(&self, base_tool: &str, flag: &str, value: &str) {
        let mut history = self.tool_arg_history.lock();
        history
            .entry(base_tool.to_string())
            .or_default()
            .entry(flag.to_string())
            .or_default()
            .insert(value.to_string());
    }

    pub fn arg_values(&self, base_tool: &str, flag: &str) -> HashSet<String> {
        self.tool_arg_history
            .lock()
            .get(base_tool)
            .and_then(|flags| flags.get(flag))
            .cloned()
            .unwrap_or_default()
    }

    pub fn push_scheduled_tool(&self, base_tool: &str) {
        self.scheduled_tools.lock().push(base_tool.to_string());
    }

    pub fn scheduled_tools(&self) -> Vec<String> {
        self.scheduled_tools.lock().clone()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
