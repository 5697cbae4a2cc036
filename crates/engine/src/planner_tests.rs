use super::*;
use crate::compiler::FixedCompilerResolver;
use sbx_core::test_support;
use std::fs;

fn write_sol(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "pragma solidity ^0.8.0;\ncontract C {}\n").unwrap();
    path
}

#[test]
fn classify_mode_detects_solidity() {
    assert_eq!(
        classify_mode(Path::new("A.sol"), false),
        Some(ExecutionMode::Solidity)
    );
}

#[test]
fn classify_mode_detects_bytecode_by_default() {
    assert_eq!(
        classify_mode(Path::new("A.hex"), false),
        Some(ExecutionMode::Bytecode)
    );
}

#[test]
fn classify_mode_detects_runtime_via_settings_flag() {
    assert_eq!(
        classify_mode(Path::new("A.hex"), true),
        Some(ExecutionMode::Runtime)
    );
}

#[test]
fn classify_mode_detects_runtime_via_rt_suffix() {
    assert_eq!(
        classify_mode(Path::new("A.rt.hex"), false),
        Some(ExecutionMode::Runtime)
    );
}

#[test]
fn classify_mode_none_for_unknown_extension() {
    assert_eq!(classify_mode(Path::new("A.txt"), false), None);
}

#[test]
fn parse_arg_map_collects_flag_values() {
    let map = parse_arg_map("--detect reentrancy-eth,reentrancy-events --json");
    assert_eq!(
        map.get("--detect").unwrap(),
        &BTreeSet::from(["reentrancy-eth".to_string(), "reentrancy-events".to_string()])
    );
    assert_eq!(map.get("--json").unwrap(), &BTreeSet::from(["".to_string()]));
}

#[test]
fn parse_arg_map_handles_equals_form() {
    let map = parse_arg_map("--max-depth=10");
    assert_eq!(map.get("--max-depth").unwrap(), &BTreeSet::from(["10".to_string()]));
}

#[test]
fn parse_arg_map_empty_string_is_empty_map() {
    assert!(parse_arg_map("").is_empty());
}

#[test]
fn resultdir_substitutes_all_placeholders() {
    let tool = test_support::tool_config("slither", ExecutionMode::Solidity);
    let absfn = PathBuf::from("/contracts/A.sol");
    let relfn = PathBuf::from("A.sol");
    let rdir = resultdir("results/$TOOL/$MODE/$FILEBASE", &tool, &absfn, &relfn, "");
    assert_eq!(rdir, PathBuf::from("results/slither/solidity/A"));
}

#[test]
fn disambiguate_appends_suffix_on_collision() {
    let mut used = HashSet::new();
    let (first, collided1) = disambiguate(PathBuf::from("results/A"), &mut used);
    let (second, collided2) = disambiguate(PathBuf::from("results/A"), &mut used);
    assert_eq!(first, PathBuf::from("results/A"));
    assert!(!collided1);
    assert_eq!(second, PathBuf::from("results/A_2"));
    assert!(collided2);
}

#[test]
fn disambiguate_keeps_incrementing_past_first_collision() {
    let mut used = HashSet::new();
    disambiguate(PathBuf::from("results/A"), &mut used);
    disambiguate(PathBuf::from("results/A"), &mut used);
    let (third, _) = disambiguate(PathBuf::from("results/A"), &mut used);
    assert_eq!(third, PathBuf::from("results/A_3"));
}

#[test]
fn collect_tasks_builds_one_task_per_matching_tool() {
    let tmp = tempfile::tempdir().unwrap();
    let absfn = write_sol(tmp.path(), "A.sol");
    let files = vec![InputFile {
        absfn: absfn.clone(),
        relfn: PathBuf::from("A.sol"),
    }];
    let tools = vec![
        test_support::tool_config("slither", ExecutionMode::Solidity),
        test_support::tool_config("echidna", ExecutionMode::Bytecode),
    ];
    let resolver = FixedCompilerResolver {
        version: "0.8.0".into(),
        path: PathBuf::from("/usr/bin/solc"),
    };
    let planner = TaskPlanner::new(resolver, "results/$TOOL/$FILEBASE");
    let state = SharedState::new();
    let settings = test_support::settings();

    let tasks = planner.collect_tasks(&files, &tools, settings, &state, false);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].tool.id.as_str(), "slither");
}

#[test]
fn collect_single_task_rejects_duplicate_tool_key() {
    let resolver = FixedCompilerResolver {
        version: "0.8.0".into(),
        path: PathBuf::from("/usr/bin/solc"),
    };
    let planner = TaskPlanner::new(resolver, "results/$TOOL/$FILEBASE");
    let state = SharedState::new();
    let settings = test_support::settings();
    let tool = test_support::tool_config("mythril", ExecutionMode::Solidity);
    let tmp = tempfile::tempdir().unwrap();
    let absfn = write_sol(tmp.path(), "A.sol");
    let relfn = PathBuf::from("A.sol");

    let first = planner
        .collect_single_task(&absfn, &relfn, &tool, settings.clone(), &state, "--modules ExternalCalls", None, false)
        .unwrap();
    assert!(first.is_some());

    let second = planner
        .collect_single_task(&absfn, &relfn, &tool, settings, &state, "--modules ExternalCalls", None, false)
        .unwrap();
    assert!(second.is_none());
}

#[test]
fn collect_single_task_rejects_subset_of_previous_args() {
    let resolver = FixedCompilerResolver {
        version: "0.8.0".into(),
        path: PathBuf::from("/usr/bin/solc"),
    };
    let planner = TaskPlanner::new(resolver, "results/$TOOL/$FILEBASE");
    let state = SharedState::new();
    let settings = test_support::settings();
    let tool = test_support::tool_config("slither", ExecutionMode::Solidity);
    let tmp = tempfile::tempdir().unwrap();
    let absfn = write_sol(tmp.path(), "A.sol");
    let relfn = PathBuf::from("A.sol");

    planner
        .collect_single_task(
            &absfn, &relfn, &tool, settings.clone(), &state,
            "--detect reentrancy-eth,reentrancy-events", None, false,
        )
        .unwrap();

    let subset = planner
        .collect_single_task(
            &absfn, &relfn, &tool, settings, &state,
            "--detect reentrancy-eth", None, false,
        )
        .unwrap();
    assert!(subset.is_none());
}

#[test]
fn collect_single_task_skips_when_mode_mismatches() {
    let resolver = FixedCompilerResolver {
        version: "0.8.0".into(),
        path: PathBuf::from("/usr/bin/solc"),
    };
    let planner = TaskPlanner::new(resolver, "results/$TOOL/$FILEBASE");
    let state = SharedState::new();
    let settings = test_support::settings();
    let tool = test_support::tool_config("echidna", ExecutionMode::Bytecode);
    let tmp = tempfile::tempdir().unwrap();
    let absfn = write_sol(tmp.path(), "A.sol");
    let relfn = PathBuf::from("A.sol");

    let result = planner
        .collect_single_task(&absfn, &relfn, &tool, settings, &state, "", None, false)
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn fixed_tool_timeout_known_values() {
    assert_eq!(fixed_tool_timeout("maian"), Some(45));
    assert_eq!(fixed_tool_timeout("slither"), None);
}
