use super::*;
use crate::compiler::FixedCompilerResolver;
use crate::planner::TaskPlanner;
use sbx_containers::{ContainerRunner, FakeContainerEngine, WaitOutcome};
use sbx_core::test_support;
use sbx_parsers::ParserRegistry;
use std::path::PathBuf;

fn make_scheduler() -> (
    Scheduler<FakeContainerEngine, FixedCompilerResolver>,
    FakeContainerEngine,
) {
    let engine = FakeContainerEngine::new();
    let runner = ContainerRunner::new(engine.clone(), std::env::temp_dir().join("sbx-scheduler-tests"));
    let executor = Arc::new(TaskExecutor::new(runner, ParserRegistry::new()));
    let resolver = FixedCompilerResolver {
        version: "0.8.0".into(),
        path: PathBuf::from("/usr/bin/solc"),
    };
    let planner = Arc::new(TaskPlanner::new(resolver, "results/$TOOL/$FILEBASE"));
    let mut tools = HashMap::new();
    tools.insert(
        "slither".to_string(),
        test_support::tool_config("slither", sbx_core::ExecutionMode::Solidity),
    );
    let state = Arc::new(SharedState::new());
    (
        Scheduler::new(executor, planner, tools, state),
        engine,
    )
}

#[tokio::test]
async fn run_completes_all_initial_tasks_without_dynamic_routing() {
    let (scheduler, engine) = make_scheduler();
    engine.set_default_wait_outcome(WaitOutcome {
        exit_code: Some(0),
        log: String::new(),
        output_tar: None,
    });

    let tmp = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.dynamic = false;
    settings.processes = 2;
    let settings = Arc::new(settings);

    let mut task = test_support::task("slither", "", settings.clone());
    task.rdir = tmp.path().join("a");
    let mut task2 = test_support::task("slither", "--json", settings.clone());
    task2.rdir = tmp.path().join("b");

    let summary = scheduler
        .run(vec![task, task2], settings, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    assert_eq!(summary.tasks_completed, 2);
    assert_eq!(summary.tasks_total, 2);
    assert!(!summary.interrupted);
}

#[tokio::test]
async fn run_stops_early_when_shutdown_flag_is_already_set() {
    let (scheduler, _engine) = make_scheduler();
    let tmp = tempfile::tempdir().unwrap();
    let settings = Arc::new(Settings::default());
    let mut task = test_support::task("slither", "", settings.clone());
    task.rdir = tmp.path().join("a");

    let shutdown = Arc::new(AtomicBool::new(true));
    let summary = scheduler.run(vec![task], settings, shutdown).await.unwrap();
    assert!(summary.interrupted);
}
