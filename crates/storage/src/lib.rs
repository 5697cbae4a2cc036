#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sbx-storage: per-task result artifacts on disk, plus SARIF conversion.

pub mod artifacts;
pub mod sarif;

pub use artifacts::{ArtifactError, ArtifactPaths};
pub use sarif::to_sarif;
