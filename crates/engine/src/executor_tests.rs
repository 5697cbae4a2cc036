use super::*;
use sbx_containers::{FakeContainerEngine, WaitOutcome};
use sbx_core::test_support;
use std::sync::Arc;

fn executor() -> (TaskExecutor<FakeContainerEngine>, FakeContainerEngine) {
    let engine = FakeContainerEngine::new();
    let runner = ContainerRunner::new(engine.clone(), std::env::temp_dir().join("sbx-executor-tests"));
    (TaskExecutor::new(runner, ParserRegistry::new()), engine)
}

#[tokio::test]
async fn execute_runs_container_and_writes_task_log() {
    let (executor, engine) = executor();
    let tmp = tempfile::tempdir().unwrap();
    let mut task = test_support::task("slither", "", test_support::settings());
    task.rdir = tmp.path().to_path_buf();
    engine.set_default_wait_outcome(WaitOutcome {
        exit_code: Some(0),
        log: "clean run".to_string(),
        output_tar: None,
    });

    let result = executor.execute(&task).await.unwrap();
    assert!(!result.skipped);
    assert_eq!(result.task_log.exit_code, Some(0));

    let paths = ArtifactPaths::new(&task.rdir);
    assert!(paths.task_log.exists());
    assert!(paths.tool_log.exists());
}

#[tokio::test]
async fn execute_skips_when_cached_log_matches_and_not_overwrite() {
    let (executor, _engine) = executor();
    let tmp = tempfile::tempdir().unwrap();
    let settings = test_support::settings();
    let mut task = test_support::task("slither", "", settings);
    task.rdir = tmp.path().to_path_buf();

    let paths = ArtifactPaths::new(&task.rdir);
    let cached = TaskLog {
        absfn: task.absfn.display().to_string(),
        relfn: task.relfn.display().to_string(),
        tool: task.tool.id.to_string(),
        tool_args: task.tool_args.clone(),
        start: String::new(),
        duration: 0.0,
        exit_code: Some(0),
        runid: "run".to_string(),
    };
    artifacts::write_task_log(&paths, &cached).unwrap();

    let result = executor.execute(&task).await.unwrap();
    assert!(result.skipped);
}

#[tokio::test]
async fn execute_reruns_when_overwrite_is_set_even_with_cached_log() {
    let (executor, engine) = executor();
    let tmp = tempfile::tempdir().unwrap();
    let mut settings = sbx_core::Settings::default();
    settings.overwrite = true;
    let mut task = test_support::task("slither", "", Arc::new(settings));
    task.rdir = tmp.path().to_path_buf();

    let paths = ArtifactPaths::new(&task.rdir);
    let cached = TaskLog {
        absfn: task.absfn.display().to_string(),
        relfn: task.relfn.display().to_string(),
        tool: task.tool.id.to_string(),
        tool_args: task.tool_args.clone(),
        start: String::new(),
        duration: 0.0,
        exit_code: Some(0),
        runid: "run".to_string(),
    };
    artifacts::write_task_log(&paths, &cached).unwrap();
    engine.set_default_wait_outcome(WaitOutcome {
        exit_code: Some(1),
        log: String::new(),
        output_tar: None,
    });

    let result = executor.execute(&task).await.unwrap();
    assert!(!result.skipped);
    assert_eq!(result.task_log.exit_code, Some(1));
}

#[tokio::test(start_paused = true)]
async fn execute_retries_after_a_transient_spawn_error() {
    let (executor, engine) = executor();
    let tmp = tempfile::tempdir().unwrap();
    let mut task = test_support::task("slither", "", test_support::settings());
    task.rdir = tmp.path().to_path_buf();
    engine.set_spawn_error("daemon unreachable");

    // The fake's spawn error is one-shot, so attempt two succeeds; paused
    // time fast-forwards through the 15-second retry delay.
    let result = executor.execute(&task).await.unwrap();
    assert!(!result.skipped);
    assert!(engine
        .calls()
        .iter()
        .filter(|c| matches!(c, sbx_containers::ContainerCall::Spawn { .. }))
        .count()
        >= 2);
}

#[tokio::test]
async fn execute_writes_sarif_when_settings_enable_it() {
    let (executor, _engine) = executor();
    let tmp = tempfile::tempdir().unwrap();
    let mut settings = sbx_core::Settings::default();
    settings.sarif = true;
    let mut task = test_support::task("slither", "", Arc::new(settings));
    task.rdir = tmp.path().to_path_buf();

    executor.execute(&task).await.unwrap();
    let paths = ArtifactPaths::new(&task.rdir);
    assert!(paths.sarif_output.exists());
}

#[tokio::test]
async fn execute_records_start_and_duration_from_the_clock() {
    use sbx_core::FakeClock;

    let engine = FakeContainerEngine::new();
    let runner = ContainerRunner::new(engine.clone(), std::env::temp_dir().join("sbx-executor-tests-clock"));
    let clock = FakeClock::new(1_700_000_000_000);
    let executor = TaskExecutor::with_clock(runner, ParserRegistry::new(), clock.clone());

    let tmp = tempfile::tempdir().unwrap();
    let mut task = test_support::task("slither", "", test_support::settings());
    task.rdir = tmp.path().to_path_buf();
    engine.set_default_wait_outcome(WaitOutcome {
        exit_code: Some(0),
        log: "clean run".to_string(),
        output_tar: None,
    });
    clock.advance_secs(5.0);

    let result = executor.execute(&task).await.unwrap();
    assert!(!result.task_log.start.is_empty());
    assert_eq!(result.task_log.duration, 0.0);
}
