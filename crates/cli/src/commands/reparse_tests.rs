use super::*;
use sbx_storage::artifacts::TASK_LOG;

#[test]
fn run_with_no_result_dirs_succeeds_without_reparsing() {
    let dir = tempfile::tempdir().unwrap();
    let args = ReparseArgs { roots: vec![dir.path().to_path_buf()], sarif: false };
    let code = run(args).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn run_tolerates_a_result_dir_missing_its_tool_output() {
    let dir = tempfile::tempdir().unwrap();
    let result_dir = dir.path().join("slither").join("Sample.sol");
    std::fs::create_dir_all(&result_dir).unwrap();
    std::fs::write(result_dir.join(TASK_LOG), "{}").unwrap();

    let args = ReparseArgs { roots: vec![dir.path().to_path_buf()], sarif: false };
    let code = run(args).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}
