//! The `ContainerEngine` abstraction: the single seam through which the
//! orchestrator talks to a container runtime. Production code uses
//! [`crate::docker::DockerEngine`] (backed by `bollard`); tests use
//! [`crate::fake::FakeContainerEngine`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the container runtime boundary.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("image not found: {0}")]
    ImageNotFound(String),
    #[error("container not found: {0}")]
    NotFound(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("timed out waiting for container {0}")]
    Timeout(String),
    #[error("container runtime error: {0}")]
    Runtime(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Everything needed to run one tool invocation in a container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Image reference, e.g. `"smartbugs/slither:latest"`.
    pub image: String,
    /// Rendered command to run, split into argv, if the tool uses `command`.
    pub command: Option<Vec<String>>,
    /// Rendered entrypoint override, if the tool uses `entrypoint`.
    pub entrypoint: Option<Vec<String>>,
    /// Host directory bind-mounted at `/sb` inside the container.
    pub workdir: PathBuf,
    pub cpu_quota: Option<u32>,
    pub mem_limit: Option<String>,
    /// Labels applied for bulk cleanup: `smartbugs=1, runid, tool, mode, file`.
    pub labels: HashMap<String, String>,
}

/// A running (or exited) container handle returned by `spawn`.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    pub id: String,
}

/// Outcome of waiting on a container to finish.
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    pub exit_code: Option<i32>,
    pub log: String,
    /// Raw bytes of the tar archive extracted from the container's expected
    /// output path, if one was present (`NotFound` is treated as non-fatal).
    pub output_tar: Option<Vec<u8>>,
}

/// Abstraction over a container runtime, mirroring the shape of a Docker client:
/// pull once, run detached, wait with a timeout, stop gracefully on timeout,
/// always clean up.
#[async_trait]
pub trait ContainerEngine: Clone + Send + Sync + 'static {
    /// Ensures `image` is present locally, pulling it if necessary.
    async fn ensure_image(&self, image: &str) -> Result<(), ContainerError>;

    /// Starts a detached container from `spec` and returns its handle.
    async fn spawn(&self, spec: ContainerSpec) -> Result<ContainerHandle, ContainerError>;

    /// Waits up to `timeout_secs` for the container to exit. On timeout,
    /// callers should follow up with [`ContainerEngine::stop`].
    async fn wait(
        &self,
        handle: &ContainerHandle,
        timeout_secs: u64,
    ) -> Result<WaitOutcome, ContainerError>;

    /// Attempts a graceful stop with `grace_secs` before force-killing.
    async fn stop(&self, handle: &ContainerHandle, grace_secs: u64) -> Result<(), ContainerError>;

    /// Force-kills and removes the container. Always safe to call, even if
    /// the container is already gone.
    async fn remove(&self, handle: &ContainerHandle) -> Result<(), ContainerError>;

    /// Removes every container carrying label `smartbugs=1` (and, if given,
    /// matching `runid`). Used for bulk cleanup on shutdown/interrupt.
    async fn cleanup(&self, runid: Option<&str>) -> Result<usize, ContainerError>;
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
