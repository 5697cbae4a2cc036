use super::*;
use crate::engine::ContainerSpec;
use std::path::PathBuf;

fn spec(image: &str) -> ContainerSpec {
    ContainerSpec {
        image: image.to_string(),
        command: Some(vec!["slither".into(), "/sb/A.sol".into()]),
        entrypoint: None,
        workdir: PathBuf::from("/tmp/work"),
        cpu_quota: None,
        mem_limit: None,
        labels: HashMap::new(),
    }
}

#[tokio::test]
async fn spawn_records_call_and_tracks_running_container() {
    let engine = FakeContainerEngine::new();
    let handle = engine.spawn(spec("smartbugs/slither")).await.unwrap();
    assert_eq!(engine.running_count(), 1);
    assert!(matches!(
        engine.calls().last(),
        Some(ContainerCall::Spawn { image }) if image == "smartbugs/slither"
    ));
    assert!(!handle.id.is_empty());
}

#[tokio::test]
async fn spawn_error_is_returned_once() {
    let engine = FakeContainerEngine::new();
    engine.set_spawn_error("docker daemon unreachable");
    let err = engine.spawn(spec("smartbugs/slither")).await.unwrap_err();
    assert!(err.to_string().contains("docker daemon unreachable"));
    // second spawn succeeds since the injected error is consumed
    assert!(engine.spawn(spec("smartbugs/slither")).await.is_ok());
}

#[tokio::test]
async fn wait_on_unknown_container_returns_not_found() {
    let engine = FakeContainerEngine::new();
    let handle = ContainerHandle {
        id: "ghost".to_string(),
    };
    let err = engine.wait(&handle, 10).await.unwrap_err();
    assert!(matches!(err, ContainerError::NotFound(_)));
}

#[tokio::test]
async fn wait_returns_queued_outcome() {
    let engine = FakeContainerEngine::new();
    let handle = engine.spawn(spec("smartbugs/mythril")).await.unwrap();
    engine.set_wait_outcome(
        &handle.id,
        WaitOutcome {
            exit_code: Some(1),
            log: "timed out".into(),
            output_tar: None,
        },
    );
    let outcome = engine.wait(&handle, 500).await.unwrap();
    assert_eq!(outcome.exit_code, Some(1));
    assert_eq!(outcome.log, "timed out");
}

#[tokio::test]
async fn wait_defaults_to_success_when_no_outcome_queued() {
    let engine = FakeContainerEngine::new();
    let handle = engine.spawn(spec("smartbugs/slither")).await.unwrap();
    let outcome = engine.wait(&handle, 10).await.unwrap();
    assert_eq!(outcome.exit_code, Some(0));
}

#[tokio::test]
async fn remove_drops_running_container() {
    let engine = FakeContainerEngine::new();
    let handle = engine.spawn(spec("smartbugs/slither")).await.unwrap();
    engine.remove(&handle).await.unwrap();
    assert_eq!(engine.running_count(), 0);
}

#[tokio::test]
async fn cleanup_clears_all_running_containers() {
    let engine = FakeContainerEngine::new();
    engine.spawn(spec("smartbugs/slither")).await.unwrap();
    engine.spawn(spec("smartbugs/mythril")).await.unwrap();
    let n = engine.cleanup(Some("run-1")).await.unwrap();
    assert_eq!(n, 2);
    assert_eq!(engine.running_count(), 0);
}
