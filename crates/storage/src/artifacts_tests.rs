use super::*;
use sbx_core::test_support;

#[test]
fn round_trips_task_log_through_atomic_write() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(tmp.path());
    let log = TaskLog {
        absfn: "/contracts/A.sol".into(),
        relfn: "A.sol".into(),
        tool: "slither".into(),
        tool_args: String::new(),
        start: "2026-08-01T00:00:00Z".into(),
        duration: 1.5,
        exit_code: Some(0),
        runid: "run".into(),
    };
    write_task_log(&paths, &log).unwrap();
    let loaded = read_task_log(&paths).unwrap();
    assert_eq!(loaded.relfn, "A.sol");
    assert_eq!(loaded.exit_code, Some(0));
}

#[test]
fn read_task_log_returns_none_when_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(tmp.path());
    assert!(read_task_log(&paths).is_none());
}

#[test]
fn clear_previous_outputs_removes_all_known_files() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(tmp.path());
    let parsed = test_support::parsed_output("generic", vec![]);
    write_parsed_output(&paths, &parsed).unwrap();
    write_tool_log(&paths, "some log").unwrap();
    assert!(paths.parser_output.exists());

    clear_previous_outputs(&paths).unwrap();
    assert!(!paths.parser_output.exists());
    assert!(!paths.tool_log.exists());
}

#[test]
fn clear_previous_outputs_is_a_no_op_when_nothing_exists() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(tmp.path());
    assert!(clear_previous_outputs(&paths).is_ok());
}

#[test]
fn write_tool_output_persists_raw_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(tmp.path());
    write_tool_output(&paths, b"tar-bytes").unwrap();
    assert_eq!(fs::read(&paths.tool_output).unwrap(), b"tar-bytes");
}
