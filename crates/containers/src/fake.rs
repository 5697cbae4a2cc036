//! In-memory `ContainerEngine` for deterministic tests.

use crate::engine::{ContainerEngine, ContainerError, ContainerHandle, ContainerSpec, WaitOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded call to [`FakeContainerEngine`], for test assertions.
#[derive(Debug, Clone)]
pub enum ContainerCall {
    EnsureImage { image: String },
    Spawn { image: String },
    Wait { id: String, timeout_secs: u64 },
    Stop { id: String },
    Remove { id: String },
    Cleanup { runid: Option<String> },
}

/// Fake container engine for testing. Records all calls and allows injecting
/// failures and canned wait outcomes, mirroring the adapter pack's
/// record-and-inject-error fake pattern.
#[derive(Clone, Default)]
pub struct FakeContainerEngine {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<ContainerCall>,
    running: HashMap<String, ContainerSpec>,
    next_id: u64,
    spawn_error: Option<String>,
    wait_outcomes: HashMap<String, WaitOutcome>,
    default_wait_outcome: Option<WaitOutcome>,
    images: std::collections::HashSet<String>,
}

impl FakeContainerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ContainerCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn set_spawn_error(&self, message: impl Into<String>) {
        self.inner.lock().spawn_error = Some(message.into());
    }

    /// Queues the outcome returned the next time `wait` is called for `id`.
    pub fn set_wait_outcome(&self, id: &str, outcome: WaitOutcome) {
        self.inner.lock().wait_outcomes.insert(id.to_string(), outcome);
    }

    /// Sets the outcome returned for any container without a specific one queued.
    pub fn set_default_wait_outcome(&self, outcome: WaitOutcome) {
        self.inner.lock().default_wait_outcome = Some(outcome);
    }

    pub fn running_count(&self) -> usize {
        self.inner.lock().running.len()
    }
}

#[async_trait]
impl ContainerEngine for FakeContainerEngine {
    async fn ensure_image(&self, image: &str) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::EnsureImage {
            image: image.to_string(),
        });
        inner.images.insert(image.to_string());
        Ok(())
    }

    async fn spawn(&self, spec: ContainerSpec) -> Result<ContainerHandle, ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Spawn {
            image: spec.image.clone(),
        });
        if let Some(message) = inner.spawn_error.take() {
            return Err(ContainerError::Runtime(message));
        }
        inner.next_id += 1;
        let id = format!("fake-container-{}", inner.next_id);
        inner.running.insert(id.clone(), spec);
        Ok(ContainerHandle { id })
    }

    async fn wait(
        &self,
        handle: &ContainerHandle,
        timeout_secs: u64,
    ) -> Result<WaitOutcome, ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Wait {
            id: handle.id.clone(),
            timeout_secs,
        });
        if !inner.running.contains_key(&handle.id) {
            return Err(ContainerError::NotFound(handle.id.clone()));
        }
        if let Some(outcome) = inner.wait_outcomes.remove(&handle.id) {
            return Ok(outcome);
        }
        Ok(inner.default_wait_outcome.clone().unwrap_or(WaitOutcome {
            exit_code: Some(0),
            log: String::new(),
            output_tar: None,
        }))
    }

    async fn stop(&self, handle: &ContainerHandle, _grace_secs: u64) -> Result<(), ContainerError> {
        self.inner.lock().calls.push(ContainerCall::Stop {
            id: handle.id.clone(),
        });
        Ok(())
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Remove {
            id: handle.id.clone(),
        });
        inner.running.remove(&handle.id);
        Ok(())
    }

    async fn cleanup(&self, runid: Option<&str>) -> Result<usize, ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Cleanup {
            runid: runid.map(str::to_string),
        });
        let n = inner.running.len();
        inner.running.clear();
        Ok(n)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
