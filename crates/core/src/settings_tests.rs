use super::*;
use std::path::PathBuf;

#[test]
fn default_settings_are_sane() {
    let settings = Settings::default();
    assert_eq!(settings.processes, 1);
    assert!(settings.dynamic);
    assert!(settings.json);
}

#[test]
fn try_claim_tool_key_rejects_duplicates() {
    let state = SharedState::new();
    let absfn = PathBuf::from("/contracts/A.sol");
    assert!(state.try_claim_tool_key(&absfn, "slither|"));
    assert!(!state.try_claim_tool_key(&absfn, "slither|"));
}

#[test]
fn try_claim_tool_key_is_per_file() {
    let state = SharedState::new();
    let a = PathBuf::from("/contracts/A.sol");
    let b = PathBuf::from("/contracts/B.sol");
    assert!(state.try_claim_tool_key(&a, "slither|"));
    assert!(state.try_claim_tool_key(&b, "slither|"));
}

#[test]
fn has_tool_key_reflects_claims() {
    let state = SharedState::new();
    let absfn = PathBuf::from("/contracts/A.sol");
    assert!(!state.has_tool_key(&absfn, "slither|"));
    state.try_claim_tool_key(&absfn, "slither|");
    assert!(state.has_tool_key(&absfn, "slither|"));
}

#[test]
fn tool_keys_for_returns_all_claimed_keys() {
    let state = SharedState::new();
    let absfn = PathBuf::from("/contracts/A.sol");
    state.try_claim_tool_key(&absfn, "slither|");
    state.try_claim_tool_key(&absfn, "mythril|--max-depth 10");
    let keys = state.tool_keys_for(&absfn);
    assert_eq!(keys.len(), 2);
}

#[test]
fn record_arg_and_arg_values_roundtrip() {
    let state = SharedState::new();
    state.record_arg("mythril", "--max-depth", "10");
    state.record_arg("mythril", "--max-depth", "20");
    let values = state.arg_values("mythril", "--max-depth");
    assert_eq!(values.len(), 2);
    assert!(values.contains("10"));
    assert!(values.contains("20"));
}

#[test]
fn arg_values_empty_for_unknown_tool() {
    let state = SharedState::new();
    assert!(state.arg_values("unknown", "--flag").is_empty());
}

#[test]
fn scheduled_tools_preserves_order() {
    let state = SharedState::new();
    state.push_scheduled_tool("slither");
    state.push_scheduled_tool("mythril");
    assert_eq!(state.scheduled_tools(), vec!["slither", "mythril"]);
}
