//! `sbx reparse`: re-parses previously-run result directories without
//! re-running any tool container, for when parser logic changes after a run.

use anyhow::Result;
use clap::Args;
use sbx_engine::{collect_result_dirs, Reparser};
use sbx_parsers::ParserRegistry;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ReparseArgs {
    /// Result-directory roots to scan for completed tasks
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Also (re)write SARIF 2.1.0 output
    #[arg(long)]
    pub sarif: bool,
}

pub fn run(args: ReparseArgs) -> Result<ExitCode> {
    let dirs = collect_result_dirs(&args.roots);
    if dirs.is_empty() {
        warn!("no result directories found under the given roots");
        return Ok(ExitCode::SUCCESS);
    }

    let reparser = Reparser::new(ParserRegistry::new());
    let ok = reparser.reparse_all(&dirs, args.sarif);
    info!(ok, total = dirs.len(), "reparse complete");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[path = "reparse_tests.rs"]
mod tests;
