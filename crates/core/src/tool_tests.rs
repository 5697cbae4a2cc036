use super::*;

fn base_config() -> ToolConfig {
    ToolConfig {
        id: ToolId::new("slither"),
        mode: ExecutionMode::Solidity,
        image: "smartbugs/slither".into(),
        name: "Slither".into(),
        origin: None,
        version: None,
        info: None,
        parser: "slither".into(),
        output: None,
        bin: None,
        default_params: None,
        solc: true,
        cpu_quota: None,
        mem_limit: None,
        command: Some("slither $FILENAME".into()),
        entrypoint: None,
    }
}

#[test]
fn validate_passes_with_image_and_command() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn validate_fails_without_image() {
    let mut cfg = base_config();
    cfg.image = "".into();
    assert!(matches!(
        cfg.validate(),
        Err(crate::error::ConfigError::MissingImage(_))
    ));
}

#[test]
fn validate_fails_without_command_or_entrypoint() {
    let mut cfg = base_config();
    cfg.command = None;
    cfg.entrypoint = None;
    assert!(matches!(
        cfg.validate(),
        Err(crate::error::ConfigError::MissingCommand(_))
    ));
}

#[test]
fn validate_passes_with_entrypoint_only() {
    let mut cfg = base_config();
    cfg.command = None;
    cfg.entrypoint = Some("/bin/run.sh".into());
    assert!(cfg.validate().is_ok());
}

#[test]
fn execution_mode_as_str() {
    assert_eq!(ExecutionMode::Solidity.as_str(), "solidity");
    assert_eq!(ExecutionMode::Bytecode.as_str(), "bytecode");
    assert_eq!(ExecutionMode::Runtime.as_str(), "runtime");
}

#[test]
fn base_tool_strips_variant_suffix() {
    let mut cfg = base_config();
    cfg.id = ToolId::new("confuzzius_core");
    assert_eq!(cfg.base_tool(), "confuzzius");
}

#[test]
fn core_tools_contains_expected_roster() {
    let names: Vec<&str> = CORE_TOOLS.iter().map(|(name, _, _)| *name).collect();
    assert_eq!(
        names,
        vec!["slither", "smartcheck", "mythril", "solhint", "maian", "confuzzius"]
    );
}
