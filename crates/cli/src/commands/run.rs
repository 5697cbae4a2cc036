//! `sbx run`: discovers contract files, builds the initial task batch, and
//! drives it to completion through the worker-pool scheduler — then, if a
//! time budget was given and the batch finished early, fills the rest with a
//! coverage-driven second phase.

use crate::{color, table};
use anyhow::{Context, Result};
use clap::Args;
use sbx_containers::{ContainerRunner, DockerEngine};
use sbx_core::{load_tool_registry, Settings, SharedState};
use sbx_engine::{collect_files, plan_budget_tasks, BudgetFile, DirCompilerResolver, Scheduler, TaskExecutor, TaskPlanner};
use sbx_parsers::ParserRegistry;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Glob patterns for .sol/.hex contract files to analyze
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Directory holding one subdirectory per tool, each with a config.yaml
    #[arg(long, default_value = "tools")]
    pub tools_dir: PathBuf,

    /// Result directory template: $TOOL $MODE $ABSDIR $RELDIR $FILENAME $FILEBASE $FILEEXT $ARGS
    #[arg(long, default_value = "results/$TOOL/$FILEBASE")]
    pub results_dir: String,

    /// Directory to stage per-task container workdirs
    #[arg(long, default_value = "workdir")]
    pub work_root: PathBuf,

    /// Directory to look for solc-<version> binaries (solc-select convention)
    #[arg(long, default_value = ".")]
    pub solc_dir: PathBuf,

    /// Number of parallel workers
    #[arg(short = 'p', long, default_value_t = 1)]
    pub processes: usize,

    /// Default per-task timeout in seconds (0 defers to each tool's preset)
    #[arg(long, default_value_t = 500)]
    pub timeout: u64,

    /// Disable dynamic routing of follow-up tools based on findings
    #[arg(long)]
    pub no_dynamic: bool,

    /// Skip a routed tool once it has already run against a file with no args
    #[arg(long)]
    pub skip_after_no_args: bool,

    /// Re-run tools even when a matching result already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Also write SARIF 2.1.0 output alongside the parsed JSON
    #[arg(long)]
    pub sarif: bool,

    /// Extra wall-clock seconds to fill with a coverage-driven second phase
    #[arg(long)]
    pub time_budget: Option<u64>,

    /// Run identifier, used to label and later clean up containers
    #[arg(long, default_value = "run")]
    pub runid: String,

    /// Treat .hex files without a .rt.hex suffix as runtime bytecode
    #[arg(long)]
    pub force_runtime: bool,
}

pub async fn run(args: RunArgs) -> Result<ExitCode> {
    let (tools, coverage_tools) = load_tool_registry(&args.tools_dir)
        .with_context(|| format!("loading tool configs from {}", args.tools_dir.display()))?;

    let patterns: Vec<(Option<PathBuf>, String)> =
        args.patterns.iter().map(|p| (None, p.clone())).collect();
    let files = collect_files(&patterns).context("collecting input files")?;
    if files.is_empty() {
        warn!("no input files matched the given patterns");
        return Ok(ExitCode::SUCCESS);
    }
    info!(count = files.len(), "discovered input files");

    let settings = Arc::new(Settings {
        processes: args.processes,
        runid: args.runid.clone(),
        default_timeout: args.timeout,
        dynamic: !args.no_dynamic,
        skip_after_no_args: args.skip_after_no_args,
        quiet: false,
        overwrite: args.overwrite,
        json: true,
        sarif: args.sarif,
        time_budget: args.time_budget,
        fuzz_mode: None,
        core_budget_timeout_base: None,
        results_dir: PathBuf::from(&args.results_dir),
    });
    let state = Arc::new(SharedState::new());

    let resolver = DirCompilerResolver { dir: args.solc_dir.clone() };
    let planner = Arc::new(TaskPlanner::new(resolver, args.results_dir.clone()));
    let tool_list: Vec<_> = tools.values().cloned().collect();
    let initial_tasks = planner.collect_tasks(&files, &tool_list, settings.clone(), &state, args.force_runtime);
    if initial_tasks.is_empty() {
        warn!("no tasks were planned for the discovered files");
        return Ok(ExitCode::SUCCESS);
    }

    let engine = DockerEngine::connect().context("connecting to the Docker daemon")?;
    let runner = ContainerRunner::new(engine, args.work_root.clone());
    let executor = Arc::new(TaskExecutor::new(runner, ParserRegistry::new()));
    let scheduler = Scheduler::new(executor, planner.clone(), tools.clone(), state.clone());

    let shutdown = Arc::new(AtomicBool::new(false));
    let signal_exit_code = Arc::new(AtomicU8::new(0));
    spawn_signal_handler(shutdown.clone(), signal_exit_code.clone());

    let start = Instant::now();
    let mut summary = scheduler.run(initial_tasks, settings.clone(), shutdown.clone()).await?;

    if !summary.interrupted {
        if let Some(budget) = settings.time_budget {
            let remaining = budget.saturating_sub(start.elapsed().as_secs());
            if remaining > 0 {
                let budget_files: Vec<BudgetFile> = files
                    .iter()
                    .map(|f| BudgetFile { absfn: f.absfn.clone(), relfn: f.relfn.clone() })
                    .collect();
                let budget_tasks = plan_budget_tasks(
                    &budget_files,
                    &coverage_tools,
                    &tools,
                    &planner,
                    settings.clone(),
                    &state,
                    remaining,
                );
                if !budget_tasks.is_empty() {
                    info!(count = budget_tasks.len(), remaining, "starting budget phase");
                    let budget_summary =
                        scheduler.run(budget_tasks, settings.clone(), shutdown.clone()).await?;
                    summary.tasks_completed += budget_summary.tasks_completed;
                    summary.tasks_total += budget_summary.tasks_total;
                    summary.interrupted |= budget_summary.interrupted;
                }
            }
        }
    }

    print_summary(&summary);

    if summary.interrupted {
        let code = signal_exit_code.load(Ordering::SeqCst);
        return Ok(ExitCode::from(if code == 0 { 130 } else { code }));
    }
    Ok(ExitCode::SUCCESS)
}

/// Installs SIGINT/SIGTERM handlers that flip `shutdown` and record which
/// signal fired, so the caller can exit 130/143 per the run's interrupt
/// semantics rather than a generic failure code.
fn spawn_signal_handler(shutdown: Arc<AtomicBool>, signal_exit_code: Arc<AtomicU8>) {
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, stopping after in-flight tasks finish");
                signal_exit_code.store(143, Ordering::SeqCst);
                shutdown.store(true, Ordering::SeqCst);
            }
            _ = sigint.recv() => {
                info!("received SIGINT, stopping after in-flight tasks finish");
                signal_exit_code.store(130, Ordering::SeqCst);
                shutdown.store(true, Ordering::SeqCst);
            }
        }
    });
}

fn print_summary(summary: &sbx_engine::RunSummary) {
    println!("{}", color::header("Run summary"));
    print!("{}", render_summary(summary));
}

fn render_summary(summary: &sbx_engine::RunSummary) -> String {
    let mut rows = table::Table::new(vec![table::Column::left("METRIC"), table::Column::left("VALUE")]);
    rows.row(vec!["tasks completed".to_string(), summary.tasks_completed.to_string()]);
    rows.row(vec!["tasks total".to_string(), summary.tasks_total.to_string()]);
    rows.row(vec![
        "status".to_string(),
        if summary.interrupted { "interrupted".to_string() } else { "done".to_string() },
    ]);
    let mut buf = Vec::new();
    rows.render(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
