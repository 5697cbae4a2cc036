//! Routes findings from a completed task to follow-up tools.
//!
//! `VULN_TOOL_MAP` is a fixed table from category to `(baseTool, args,
//! timeoutLabel)`. A category with more than one entry resolves to whichever
//! was registered last — Rust's `match` below lists only the entry that
//! survives the original table's "later key wins" dict-literal semantics
//! (e.g. `Overflow` ends up routed to `osiris`, not `mythril` or `conkas`,
//! because `osiris` was the last entry under that key).

use crate::error::RouteError;
use sbx_core::{Category, SharedState};
use std::collections::BTreeMap;
use std::path::Path;

/// One routing candidate: base tool, its argument string, and an optional
/// timeout preset label resolved later via the timeout table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCandidate {
    pub base_tool: &'static str,
    pub args: &'static str,
    pub timeout_label: Option<&'static str>,
}

/// Looks up the single routing candidate for `category`, keeping only the
/// last-registered entry when a category has more than one (mirrors the
/// Python dict-literal's "later key wins" semantics).
fn lookup(category: Category) -> Option<RouteCandidate> {
    use Category::*;
    let candidate = match category {
        Reentrancy => ("mythril", "--modules ExternalCalls", Some("normal")),
        LowLevelCall => ("conkas", "-vt unchecked_ll_calls", None),
        UnlockedEther => ("slither", "--detect reentrancy-eth, reentrancy-events, reentrancy-no-eth", None),
        FrontRunning => ("slither", "--detect out-of-order-retryable", None),
        Suicidal => ("maian", "-c 0", None),
        Prodigal => ("maian", "-c 1", None),
        GreedyContract => ("manticore", "--thorough-mode", None),
        ArbitrarySend => ("slither", "--detect arbitrary-send-erc20, arbitrary-send-erc20-permit, arbitrary-send-eth", None),
        Overflow => ("osiris", "", None),
        Underflow => ("osiris", "", None),
        UninitializedStoragePointer => ("slither", "--detect uninitialized-storage", None),
        UninitializedStorage => ("slither", "--detect uninitialized-state", None),
        Delegatecall => ("mythril", "--modules ArbitraryDelegateCall", None),
        Selfdestruct => ("maian", "-c 0", None),
        AssertViolation => ("mythril", "--modules Exceptions", None),
        WriteToArbitraryStorage => ("mythril", "--modules ArbitraryStorage", None),
        BlockDependence => ("conkas", "-vt time_manipulation", None),
        WeakRandomness => ("slither", "--detect weak-prng", None),
        VariableShadowing => ("slither", "--detect shadowing-state", None),
        DeprecatedFunction => ("slither", "--detect deprecated-standards", None),
        UnusedStateVariable => ("slither", "--detect unused-state", None),
        StrictBalanceEquality => ("mythril", "--modules UnexpectedEther", None),
        ArbitraryJump => ("manticore", "--policy icount", None),
        DosGasLimit => ("securify", "", None),
        Leak => ("slither", "--detect uninitialized-storage", None),
        OutdatedCompiler => ("slither", "--detect solc-version", None),
        VersionPragma => ("slither", "--detect solc-version", None),
        Other => return None,
    };
    Some(RouteCandidate {
        base_tool: candidate.0,
        args: candidate.1,
        timeout_label: candidate.2,
    })
}

/// Resolves a timeout preset label (e.g. `"normal"`, `"accurate"`) to seconds.
pub fn resolve_timeout_label(label: &str) -> Option<u64> {
    match label {
        "fast" => Some(15),
        "normal" => Some(500),
        "accurate" => Some(900),
        "maian" => Some(45),
        "confuzzius_core" => Some(50),
        _ => None,
    }
}

/// Final routing output: one merged invocation per distinct base tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedTask {
    pub base_tool: String,
    pub args: String,
    pub timeout: Option<u64>,
}

/// Classifies `categories`, dedups/subsumes against `scheduled_tools_for_file`
/// (the set of tool keys already scheduled for `absfn`) via `state`, merges
/// per-tool argument flags, and emits the final routed task list.
pub fn route(
    categories: &[Category],
    state: &SharedState,
    absfn: &Path,
    skip_after_no_args: bool,
) -> Result<Vec<RoutedTask>, RouteError> {
    let existing = state.tool_keys_for(&absfn);
    let mut scheduled_this_call: std::collections::HashSet<String> = Default::default();

    // base_tool -> set of non-empty arg strings seen (empty set means "run bare").
    // A later bare entry clears a tool's accumulated args; a later flagged entry
    // re-populates it — last writer wins per category, not per tool overall.
    let mut tool_args_map: BTreeMap<String, std::collections::BTreeSet<String>> = BTreeMap::new();
    let mut tool_timeout_map: BTreeMap<String, u64> = BTreeMap::new();

    for &category in categories {
        let Some(candidate) = lookup(category) else {
            continue;
        };
        let base = candidate.base_tool.split('-').next().unwrap_or(candidate.base_tool);
        let args = candidate.args.trim();
        let timeout = candidate
            .timeout_label
            .and_then(resolve_timeout_label);

        let base_key = format!("{base}|");
        let tool_key = format!("{base}|{args}");

        if skip_after_no_args
            && (existing.contains(base_key.as_str()) || scheduled_this_call.contains(&base_key))
        {
            continue;
        }
        if existing.contains(tool_key.as_str()) || scheduled_this_call.contains(&tool_key) {
            continue;
        }
        scheduled_this_call.insert(tool_key);

        let entry = tool_args_map.entry(base.to_string()).or_default();
        if args.is_empty() {
            entry.clear();
        } else {
            entry.insert(args.to_string());
        }

        if let Some(timeout) = timeout {
            let entry = tool_timeout_map.entry(base.to_string()).or_insert(timeout);
            if timeout > *entry {
                *entry = timeout;
            }
        }
    }

    let mut routed = Vec::new();
    for (base, args_set) in tool_args_map {
        let timeout = tool_timeout_map.get(&base).copied();
        if args_set.is_empty() {
            routed.push(RoutedTask {
                base_tool: base,
                args: String::new(),
                timeout,
            });
            continue;
        }
        routed.push(RoutedTask {
            base_tool: base,
            args: merge_flag_groups(&args_set),
            timeout,
        });
    }

    Ok(routed)
}

/// Groups args by their first whitespace-delimited token (the flag) and
/// comma-joins the values, so e.g. `"--detect a"` + `"--detect b"` becomes
/// `"--detect a,b"`.
fn merge_flag_groups(args_set: &std::collections::BTreeSet<String>) -> String {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for arg in args_set {
        let (flag, value) = match arg.split_once(' ') {
            Some((flag, value)) => (flag.to_string(), value.to_string()),
            None => (arg.clone(), String::new()),
        };
        groups.entry(flag).or_default().push(value);
    }
    groups
        .into_iter()
        .map(|(flag, values)| {
            if values.iter().any(|v| !v.is_empty()) {
                format!("{flag} {}", values.join(","))
            } else {
                flag
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
