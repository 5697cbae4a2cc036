//! Second-phase "budget" planning: once the main dynamic run finishes with
//! wall-clock time left over, schedule follow-up tool runs sized to use up
//! the remaining budget instead of leaving it idle.
//!
//! Grounded on the original analyzer's `budget.py`: round-robin missing
//! coverage tools across files, falling back to a fuzzer (`sfuzz`) once a
//! file has run every coverage tool, sizing each task's timeout off the
//! remaining budget divided across the tasks still to schedule.

use crate::compiler::CompilerResolver;
use crate::planner::TaskPlanner;
use sbx_core::{Settings, SharedState, Task, ToolConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Fraction of the remaining wall-clock time the budget phase aims to fill.
pub const BUDGET_TARGET_FRACTION: f64 = 0.8;
/// Floor on any planned task's timeout, regardless of how little time is left.
pub const BUDGET_MIN_TIMEOUT: u64 = 10;
/// Fallback fuzzer scheduled once per file after every coverage tool has run.
pub const FALLBACK_TOOL: &str = "sfuzz";

#[derive(Debug, Clone)]
pub struct BudgetFile {
    pub absfn: PathBuf,
    pub relfn: PathBuf,
}

/// Plans a round of follow-up tasks sized to use `remaining_seconds` of
/// wall-clock time across `settings.processes` workers.
///
/// `coverage_tools` is the ordered list of base tool names a file should run
/// at least once before it's considered "covered" (the fallback tool is
/// never in this list — it's scheduled only once coverage is complete).
pub fn plan_budget_tasks<R: CompilerResolver>(
    files: &[BudgetFile],
    coverage_tools: &[String],
    tools: &HashMap<String, ToolConfig>,
    planner: &TaskPlanner<R>,
    settings: Arc<Settings>,
    state: &SharedState,
    remaining_seconds: u64,
) -> Vec<Task> {
    if remaining_seconds == 0 || coverage_tools.is_empty() || files.is_empty() {
        return Vec::new();
    }

    let sol_files: Vec<&BudgetFile> = files
        .iter()
        .filter(|f| f.absfn.extension().map(|e| e == "sol").unwrap_or(false))
        .collect();
    if sol_files.is_empty() {
        return Vec::new();
    }

    let missing_per_file: HashMap<PathBuf, Vec<String>> = sol_files
        .iter()
        .map(|f| {
            let used_bases: std::collections::HashSet<String> = state
                .tool_keys_for(&f.absfn)
                .into_iter()
                .map(|k| k.split('|').next().unwrap_or("").to_string())
                .collect();
            let missing: Vec<String> = coverage_tools
                .iter()
                .filter(|t| !used_bases.contains(t.as_str()))
                .cloned()
                .collect();
            (f.absfn.clone(), missing)
        })
        .collect();

    let potential_tasks: usize = sol_files
        .iter()
        .map(|f| {
            let used_bases: std::collections::HashSet<String> = state
                .tool_keys_for(&f.absfn)
                .into_iter()
                .map(|k| k.split('|').next().unwrap_or("").to_string())
                .collect();
            let mut n = missing_per_file.get(&f.absfn).map(Vec::len).unwrap_or(0);
            if !used_bases.contains(FALLBACK_TOOL) {
                n += 1;
            }
            n
        })
        .sum();

    let processes = settings.processes.max(1) as u64;
    let target_worker_seconds = (remaining_seconds as f64 * processes as f64 * BUDGET_TARGET_FRACTION) as u64;
    let per_task_base = BUDGET_MIN_TIMEOUT.max(
        (target_worker_seconds as f64 / potential_tasks.max(1) as f64).ceil() as u64,
    );

    let mut planned = Vec::new();
    let mut planned_worker_seconds = 0u64;
    let mut next_idx: HashMap<PathBuf, usize> = sol_files.iter().map(|f| (f.absfn.clone(), 0)).collect();
    let mut fallback_scheduled: std::collections::HashSet<PathBuf> = std::collections::HashSet::new();

    let mut schedule = |absfn: &std::path::Path, relfn: &std::path::Path, tool_name: &str, planned_worker_seconds: &mut u64| -> bool {
        let Some(tool) = tools.get(tool_name) else {
            return false;
        };
        let tool_min = crate::router::resolve_timeout_label(tool_name).unwrap_or(0);
        let mut eff_timeout = BUDGET_MIN_TIMEOUT.max(per_task_base).max(tool_min);
        eff_timeout = eff_timeout.min(remaining_seconds);

        match planner.collect_single_task(absfn, relfn, tool, settings.clone(), state, "", Some(eff_timeout), false) {
            Ok(Some(task)) => {
                info!(tool = tool_name, file = %relfn.display(), timeout = eff_timeout, "budget: scheduling");
                planned.push(task);
                *planned_worker_seconds += eff_timeout;
                true
            }
            _ => false,
        }
    };

    let mut progress = true;
    while planned_worker_seconds < target_worker_seconds && progress {
        progress = false;
        for file in &sol_files {
            let used_bases: std::collections::HashSet<String> = state
                .tool_keys_for(&file.absfn)
                .into_iter()
                .map(|k| k.split('|').next().unwrap_or("").to_string())
                .collect();
            let idx = *next_idx.get(&file.absfn).unwrap_or(&0);
            let missing = missing_per_file.get(&file.absfn).cloned().unwrap_or_default();
            if idx < missing.len() {
                if schedule(&file.absfn, &file.relfn, &missing[idx], &mut planned_worker_seconds) {
                    next_idx.insert(file.absfn.clone(), idx + 1);
                    progress = true;
                } else {
                    next_idx.insert(file.absfn.clone(), idx + 1);
                }
            } else if !used_bases.contains(FALLBACK_TOOL) && !fallback_scheduled.contains(&file.absfn) {
                fallback_scheduled.insert(file.absfn.clone());
                if schedule(&file.absfn, &file.relfn, FALLBACK_TOOL, &mut planned_worker_seconds) {
                    progress = true;
                }
            }
            if planned_worker_seconds >= target_worker_seconds {
                break;
            }
        }
    }

    info!(
        count = planned.len(),
        worker_seconds = planned_worker_seconds,
        "budget: planned batch"
    );
    planned
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
