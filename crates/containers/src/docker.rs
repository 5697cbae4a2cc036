//! Production [`ContainerEngine`] backed by the Docker Engine API via `bollard`.

use crate::engine::{ContainerEngine, ContainerError, ContainerHandle, ContainerSpec, WaitOutcome};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, LogsOptions, RemoveContainerOptions,
    StopContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Wraps a shared `bollard::Docker` client.
#[derive(Clone)]
pub struct DockerEngine {
    client: Docker,
}

impl DockerEngine {
    /// Connects to the local Docker daemon using the standard environment
    /// (`DOCKER_HOST`, TLS vars, or the platform default socket).
    pub fn connect() -> Result<Self, ContainerError> {
        let client =
            Docker::connect_with_local_defaults().map_err(|e| ContainerError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    fn label_filter(runid: Option<&str>) -> HashMap<String, Vec<String>> {
        let mut filters = HashMap::new();
        let mut label_values = vec!["smartbugs=1".to_string()];
        if let Some(runid) = runid {
            label_values.push(format!("runid={runid}"));
        }
        filters.insert("label".to_string(), label_values);
        filters
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ensure_image(&self, image: &str) -> Result<(), ContainerError> {
        let images = self
            .client
            .inspect_image(image)
            .await;
        if images.is_ok() {
            return Ok(());
        }
        debug!(image, "image not present locally, pulling");
        let mut stream = self.client.create_image(
            Some(CreateImageOptions {
                from_image: image,
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = stream.next().await {
            progress.map_err(|e| ContainerError::Runtime(e.to_string()))?;
        }
        Ok(())
    }

    async fn spawn(&self, spec: ContainerSpec) -> Result<ContainerHandle, ContainerError> {
        let binds = vec![format!("{}:/sb", spec.workdir.display())];
        let host_config = bollard::models::HostConfig {
            binds: Some(binds),
            cpu_quota: spec.cpu_quota.map(|q| q as i64),
            memory: spec
                .mem_limit
                .as_deref()
                .and_then(parse_mem_limit_bytes),
            auto_remove: Some(false),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: spec.command.clone(),
            entrypoint: spec.entrypoint.clone(),
            labels: Some(spec.labels.clone()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        self.client
            .start_container::<String>(&response.id, None)
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        Ok(ContainerHandle { id: response.id })
    }

    async fn wait(
        &self,
        handle: &ContainerHandle,
        timeout_secs: u64,
    ) -> Result<WaitOutcome, ContainerError> {
        let wait_future = async {
            let mut stream = self
                .client
                .wait_container(&handle.id, None::<WaitContainerOptions<String>>);
            let mut exit_code = None;
            while let Some(result) = stream.next().await {
                match result {
                    Ok(response) => exit_code = Some(response.status_code as i32),
                    Err(e) => return Err(ContainerError::Runtime(e.to_string())),
                }
            }
            Ok(exit_code)
        };

        let exit_code = tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            wait_future,
        )
        .await
        .map_err(|_| ContainerError::Timeout(handle.id.clone()))??;

        let log = self.collect_logs(&handle.id).await?;
        let output_tar = self.collect_output_tar(&handle.id).await;

        Ok(WaitOutcome {
            exit_code,
            log,
            output_tar,
        })
    }

    async fn stop(&self, handle: &ContainerHandle, grace_secs: u64) -> Result<(), ContainerError> {
        self.client
            .stop_container(
                &handle.id,
                Some(StopContainerOptions {
                    t: grace_secs as i64,
                }),
            )
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        let result = self
            .client
            .remove_container(
                &handle.id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(()),
            Err(e) => Err(ContainerError::Runtime(e.to_string())),
        }
    }

    async fn cleanup(&self, runid: Option<&str>) -> Result<usize, ContainerError> {
        let containers = self
            .client
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters: Self::label_filter(runid),
                ..Default::default()
            }))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        let mut removed = 0;
        for container in containers {
            if let Some(id) = container.id {
                if let Err(e) = self.remove(&ContainerHandle { id: id.clone() }).await {
                    warn!(container_id = %id, error = %e, "failed to remove container during cleanup");
                } else {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

impl DockerEngine {
    async fn collect_logs(&self, id: &str) -> Result<String, ContainerError> {
        let mut stream = self.client.logs(
            id,
            Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );
        let mut log = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(output) => log.push_str(&output.to_string()),
                Err(e) => return Err(ContainerError::Runtime(e.to_string())),
            }
        }
        Ok(log)
    }

    /// Extracts the tool's expected output tar from the container, treating a
    /// missing path as non-fatal (the tool simply produced no artifact).
    async fn collect_output_tar(&self, id: &str) -> Option<Vec<u8>> {
        let mut stream = self.client.download_from_container(
            id,
            Some(bollard::container::DownloadFromContainerOptions {
                path: "/sb/result.tar",
            }),
        );
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(data) => bytes.extend_from_slice(&data),
                Err(_) => return None,
            }
        }
        if bytes.is_empty() {
            None
        } else {
            Some(bytes)
        }
    }
}

/// Parses a mem-limit string like `"4g"`, `"512m"`, `"1024k"` into bytes.
fn parse_mem_limit_bytes(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (digits, suffix) = raw.split_at(raw.len().saturating_sub(1));
    let multiplier: i64 = match suffix.to_ascii_lowercase().as_str() {
        "k" => 1024,
        "m" => 1024 * 1024,
        "g" => 1024 * 1024 * 1024,
        _ => return raw.parse().ok(),
    };
    digits.parse::<i64>().ok().map(|n| n * multiplier)
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
