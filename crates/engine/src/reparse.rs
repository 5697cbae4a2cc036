//! Re-parses previously-run result directories without re-running the tool
//! container, for when parsing logic changes after the original run.
//!
//! Grounded on the original analyzer's standalone `reparse` entry point: walk
//! given roots for directories holding a task log, clear any stale parser
//! output, and re-parse the tool's captured log/output tar.

use crate::error::ReparseError;
use sbx_parsers::{ParseInput, ParserRegistry};
use sbx_storage::artifacts::{self, ArtifactPaths};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Walks `roots` and returns every directory that contains a task log,
/// sorted and deduplicated.
pub fn collect_result_dirs(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();
    for root in roots {
        walk(root, &mut found);
    }
    found.into_iter().collect()
}

fn walk(dir: &Path, found: &mut BTreeSet<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut has_task_log = false;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().and_then(|n| n.to_str()) == Some(artifacts::TASK_LOG) {
            has_task_log = true;
        }
    }
    if has_task_log {
        found.insert(dir.to_path_buf());
    }
    for subdir in subdirs {
        walk(&subdir, found);
    }
}

pub struct Reparser {
    parsers: ParserRegistry,
}

impl Reparser {
    pub fn new(parsers: ParserRegistry) -> Self {
        Self { parsers }
    }

    /// Re-parses one result directory's captured tool output, overwriting
    /// `result.json` (and `result.sarif` when `sarif` is set).
    pub fn reparse_dir(&self, dir: &Path, sarif: bool) -> Result<(), ReparseError> {
        let paths = ArtifactPaths::new(dir);

        let task_log = artifacts::read_task_log(&paths)
            .ok_or_else(|| ReparseError::MissingTaskLog(dir.display().to_string()))?;

        for stale in [&paths.parser_output, &paths.sarif_output] {
            if stale.exists() {
                fs::remove_file(stale).map_err(|e| ReparseError::Io(e.to_string()))?;
            }
        }
        if paths.parser_output.exists() || paths.sarif_output.exists() {
            return Err(ReparseError::StaleOutput(dir.display().to_string()));
        }

        let log = fs::read_to_string(&paths.tool_log).unwrap_or_default();
        let tar = fs::read(&paths.tool_output).ok();

        info!(dir = %dir.display(), "reparsing");
        let parser = self.parsers.get(&task_log.tool);
        let parsed = parser.parse(&ParseInput {
            exit_code: task_log.exit_code,
            log: &log,
            tool_args: task_log.tool_args.split_whitespace().map(str::to_string).collect(),
            output_tar: tar.as_deref(),
        });

        artifacts::write_parsed_output(&paths, &parsed).map_err(|e| ReparseError::Io(e.to_string()))?;
        if sarif {
            let rendered = sbx_storage::to_sarif(&task_log.tool, &parsed);
            artifacts::write_sarif(&paths, &rendered).map_err(|e| ReparseError::Io(e.to_string()))?;
        }
        Ok(())
    }

    /// Re-parses every directory in `dirs`, logging (not failing) on
    /// per-directory errors so one bad result doesn't abort the batch.
    pub fn reparse_all(&self, dirs: &[PathBuf], sarif: bool) -> usize {
        let mut ok = 0;
        for dir in dirs {
            match self.reparse_dir(dir, sarif) {
                Ok(()) => ok += 1,
                Err(e) => warn!(dir = %dir.display(), error = %e, "reparse failed"),
            }
        }
        ok
    }
}

#[cfg(test)]
#[path = "reparse_tests.rs"]
mod tests;
