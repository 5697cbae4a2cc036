//! Solidity compiler resolution, abstracted so tests don't need real `solc`
//! binaries or network access to the solc-version list.

use std::path::PathBuf;

/// Resolves a pragma string to a concrete solc version and local binary path.
///
/// A resolution failure is a warning, not an error: the caller skips the
/// (file, tool) pair rather than aborting the whole run.
pub trait CompilerResolver: Send + Sync {
    fn resolve(&self, pragma: &str) -> Option<(String, PathBuf)>;
}

/// Always resolves to a fixed, pinned version — useful for tests and for
/// environments that only have one solc binary installed.
pub struct FixedCompilerResolver {
    pub version: String,
    pub path: PathBuf,
}

impl CompilerResolver for FixedCompilerResolver {
    fn resolve(&self, _pragma: &str) -> Option<(String, PathBuf)> {
        Some((self.version.clone(), self.path.clone()))
    }
}

/// Never resolves — for tools/tests that should always hit the "skip" path.
pub struct NullCompilerResolver;

impl CompilerResolver for NullCompilerResolver {
    fn resolve(&self, _pragma: &str) -> Option<(String, PathBuf)> {
        None
    }
}

/// Extracts the first `pragma solidity ...;` line from Solidity source.
pub fn extract_pragma(source: &str) -> Option<String> {
    source
        .lines()
        .find(|line| line.trim_start().starts_with("pragma solidity"))
        .map(|line| line.trim().to_string())
}

/// Extracts the first `x.y.z` version literal out of a pragma string.
fn first_version_literal(pragma: &str) -> Option<String> {
    pragma
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .find(|token| token.matches('.').count() == 2 && token.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Resolves a pragma against solc binaries installed under a local directory,
/// named `solc-<version>` (the convention tools like `solc-select` use).
/// Acquiring compilers over the network is out of scope; this only looks at
/// what's already on disk.
pub struct DirCompilerResolver {
    pub dir: PathBuf,
}

impl CompilerResolver for DirCompilerResolver {
    fn resolve(&self, pragma: &str) -> Option<(String, PathBuf)> {
        let version = first_version_literal(pragma)?;
        let candidate = self.dir.join(format!("solc-{version}"));
        if candidate.is_file() {
            return Some((version, candidate));
        }
        None
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
