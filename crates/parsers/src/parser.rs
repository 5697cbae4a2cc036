//! The parser contract: turns a finished container's raw log/output into a
//! normalized [`ParsedOutput`], mirroring the original analyzer's per-tool
//! `parse(exit_code, log, output) -> (findings, errors, fails)` contract.

use sbx_core::{Finding, ParsedOutput};

/// Converts one tool's raw container output into normalized findings.
///
/// Implementations should never panic on malformed input: a parser failure
/// is reported as an entry in `ParsedOutput::fails`, not a crash, since a
/// single tool parser error must never take down the whole run.
pub trait Parser: Send + Sync {
    /// Stable identifier matching the tool's `parser` config field.
    fn id(&self) -> &str;

    /// Parses the container's exit code, captured log, and (if the tool
    /// writes one) its output tar archive, into a [`ParsedOutput`].
    fn parse(&self, ctx: &ParseInput<'_>) -> ParsedOutput;
}

/// Everything a [`Parser`] needs to interpret one task's result.
pub struct ParseInput<'a> {
    pub exit_code: Option<i32>,
    pub log: &'a str,
    pub tool_args: Vec<String>,
    pub output_tar: Option<&'a [u8]>,
}

/// Looks up a named file's contents inside a tar archive, if present.
pub fn extract_tar_entry(tar_bytes: &[u8], path: &str) -> Option<Vec<u8>> {
    let mut archive = tar::Archive::new(tar_bytes);
    let entries = archive.entries().ok()?;
    for entry in entries.flatten() {
        let mut entry = entry;
        let entry_path = entry.path().ok()?.to_string_lossy().to_string();
        if entry_path == path || entry_path.ends_with(path) {
            use std::io::Read;
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf).ok()?;
            return Some(buf);
        }
    }
    None
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
