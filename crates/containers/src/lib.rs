#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sbx-containers: the `ContainerEngine` boundary and the runner that stages
//! and executes one task's container.

pub mod docker;
pub mod engine;
pub mod runner;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use docker::DockerEngine;
pub use engine::{ContainerEngine, ContainerError, ContainerHandle, ContainerSpec, WaitOutcome};
pub use runner::ContainerRunner;
pub use template::{render, split_argv, TemplateContext};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ContainerCall, FakeContainerEngine};
