//! Worker-pool scheduler: pulls tasks from a queue, executes them, and —
//! in dynamic mode — routes each completed task's findings to follow-up
//! tools, topping up with a missing core tool when routing adds nothing new.
//!
//! Grounded on the original analyzer's multiprocessing `analyser()`/`run()`
//! pair, translated from OS processes + a `JoinableQueue` to tokio tasks +
//! an mpsc channel. Signal handling is not installed here: the caller shares
//! an `Arc<AtomicBool>` shutdown flag, set from wherever it installs SIGINT/
//! SIGTERM handlers (the `cli` crate's run loop).

use crate::compiler::CompilerResolver;
use crate::error::EngineError;
use crate::executor::TaskExecutor;
use crate::planner::TaskPlanner;
use crate::router::{self, RoutedTask};
use sbx_containers::ContainerEngine;
use sbx_core::{Settings, SharedState, Task, ToolConfig, CORE_TOOLS};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Counters {
    tasks_total: u64,
    tasks_started: u64,
    tasks_completed: u64,
    time_completed: f64,
}

enum WorkItem {
    Task(Task),
    Stop,
}

/// Summary returned once a run's queue has drained or been interrupted.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub tasks_completed: u64,
    pub tasks_total: u64,
    pub interrupted: bool,
}

pub struct Scheduler<E: ContainerEngine, R: CompilerResolver> {
    executor: Arc<TaskExecutor<E>>,
    planner: Arc<TaskPlanner<R>>,
    tools: HashMap<String, ToolConfig>,
    state: Arc<SharedState>,
}

impl<E: ContainerEngine + 'static, R: CompilerResolver + 'static> Scheduler<E, R> {
    pub fn new(
        executor: Arc<TaskExecutor<E>>,
        planner: Arc<TaskPlanner<R>>,
        tools: HashMap<String, ToolConfig>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            executor,
            planner,
            tools,
            state,
        }
    }

    /// Runs `initial_tasks` to completion (or until `shutdown` is observed
    /// set), dynamically routing follow-up tasks as results come in.
    pub async fn run(
        &self,
        initial_tasks: Vec<Task>,
        settings: Arc<Settings>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<RunSummary, EngineError> {
        let counters = Arc::new(parking_lot::Mutex::new(Counters {
            tasks_total: initial_tasks.len() as u64,
            ..Default::default()
        }));

        let (tx, rx) = mpsc::unbounded_channel::<WorkItem>();
        let rx = Arc::new(AsyncMutex::new(rx));

        for task in initial_tasks {
            let _ = tx.send(WorkItem::Task(task));
        }

        let timeout_hint = settings.default_timeout;
        let mut handles = Vec::new();
        for _ in 0..settings.processes.max(1) {
            let worker = Worker {
                executor: self.executor.clone(),
                planner: self.planner.clone(),
                tools: self.tools.clone(),
                state: self.state.clone(),
                tx: tx.clone(),
                rx: rx.clone(),
                counters: counters.clone(),
                settings: settings.clone(),
                shutdown: shutdown.clone(),
                timeout_hint,
            };
            handles.push(tokio::spawn(worker.run()));
        }

        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            let (completed, total) = {
                let c = counters.lock();
                (c.tasks_completed, c.tasks_total)
            };
            if completed >= total {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        let interrupted = shutdown.load(Ordering::SeqCst);
        if interrupted {
            warn!("interrupt received, stopping scheduler");
            self.executor.cleanup_containers(Some(settings.runid.as_str())).await;
        }

        // Signal every worker to stop, then wait for them to drain.
        for _ in 0..handles.len() {
            let _ = tx.send(WorkItem::Stop);
        }
        for handle in handles {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        let c = counters.lock();
        Ok(RunSummary {
            tasks_completed: c.tasks_completed,
            tasks_total: c.tasks_total,
            interrupted,
        })
    }
}

struct Worker<E: ContainerEngine, R: CompilerResolver> {
    executor: Arc<TaskExecutor<E>>,
    planner: Arc<TaskPlanner<R>>,
    tools: HashMap<String, ToolConfig>,
    state: Arc<SharedState>,
    tx: mpsc::UnboundedSender<WorkItem>,
    rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<WorkItem>>>,
    counters: Arc<parking_lot::Mutex<Counters>>,
    settings: Arc<Settings>,
    shutdown: Arc<AtomicBool>,
    timeout_hint: u64,
}

impl<E: ContainerEngine + 'static, R: CompilerResolver + 'static> Worker<E, R> {
    async fn run(self) {
        loop {
            let item = {
                let mut rx = self.rx.lock().await;
                rx.recv().await
            };
            let task = match item {
                Some(WorkItem::Task(task)) => task,
                Some(WorkItem::Stop) | None => break,
            };

            let started = {
                let mut c = self.counters.lock();
                c.tasks_started += 1;
                c.tasks_started
            };
            let args_info = if task.tool_args.trim().is_empty() {
                " with no args".to_string()
            } else {
                format!(" with args {}", task.tool_args.trim())
            };
            info!(
                "Starting task {started}/{}: {}{args_info} on {}",
                self.counters.lock().tasks_total,
                task.tool.id,
                task.relfn.display()
            );

            let start = Instant::now();
            let mut new_tool_added = false;
            match self.executor.execute(&task).await {
                Ok(result) => {
                    let duration = start.elapsed().as_secs_f64();
                    if !self.shutdown.load(Ordering::SeqCst) && self.settings.dynamic {
                        new_tool_added = self.route_followups(&task, &result.findings);
                    }
                    self.post_analysis(duration, self.timeout_hint, self.timeout_hint > 0);
                }
                Err(e) => {
                    warn!(task_id = %task.id, error = %e, "task execution failed");
                    self.post_analysis(0.0, self.timeout_hint, self.timeout_hint > 0);
                }
            }

            if !self.shutdown.load(Ordering::SeqCst) {
                self.schedule_missing_core_tool(&task, new_tool_added);
            }
        }
    }

    /// Routes `findings`' categories to follow-up tools, enqueuing any task
    /// the planner builds. Returns whether at least one follow-up was added.
    fn route_followups(&self, task: &Task, findings: &[sbx_core::Finding]) -> bool {
        let categories: Vec<_> = findings.iter().map(|f| f.category).collect();
        let routed = match router::route(
            &categories,
            &self.state,
            &task.absfn,
            self.settings.skip_after_no_args,
        ) {
            Ok(routed) => routed,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "routing failed");
                return false;
            }
        };

        let mut added = false;
        for RoutedTask { base_tool, args, timeout } in routed {
            added |= self.try_enqueue(&task.absfn, &task.relfn, &base_tool, &args, timeout);
        }
        added
    }

    /// Schedules the first core tool not yet run against this file, unless
    /// routing already added something new this round.
    fn schedule_missing_core_tool(&self, task: &Task, new_tool_added: bool) {
        if new_tool_added || !self.settings.dynamic {
            return;
        }
        let scheduled: std::collections::HashSet<String> = self
            .state
            .tool_keys_for(&task.absfn)
            .into_iter()
            .map(|k| k.split('|').next().unwrap_or("").to_string())
            .collect();

        let Some((name, args, _label)) = CORE_TOOLS.iter().find(|(name, _, _)| !scheduled.contains(*name))
        else {
            return;
        };
        self.try_enqueue(&task.absfn, &task.relfn, name, args, None);
    }

    fn try_enqueue(
        &self,
        absfn: &std::path::Path,
        relfn: &std::path::Path,
        base_tool: &str,
        args: &str,
        timeout: Option<u64>,
    ) -> bool {
        let Some(tool) = self.tools.get(base_tool) else {
            warn!(tool = base_tool, "no configured tool for routed base name, skipping");
            return false;
        };
        match self.planner.collect_single_task(
            absfn,
            relfn,
            tool,
            self.settings.clone(),
            &self.state,
            args,
            timeout,
            false,
        ) {
            Ok(Some(new_task)) => {
                self.counters.lock().tasks_total += 1;
                let _ = self.tx.send(WorkItem::Task(new_task));
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(tool = base_tool, error = %e, "failed to build routed task");
                false
            }
        }
    }

    /// Updates completion accounting and logs the estimated time to
    /// completion, matching `time_so_far / completed * remaining / workers`.
    ///
    /// `timed_out_round` mirrors the original's unconditional `if timeout:`
    /// check on the configured timeout: whenever a timeout is set, the
    /// estimate assumes one full round of workers ran into it, padding
    /// `completed`/`time_so_far` by `no_processes` workers' worth before
    /// dividing.
    fn post_analysis(&self, duration: f64, timeout_hint: u64, timed_out_round: bool) {
        let mut c = self.counters.lock();
        c.tasks_completed += 1;
        c.time_completed += duration;

        let mut completed = c.tasks_completed;
        let mut time_so_far = c.time_completed;
        let remaining = c.tasks_total.saturating_sub(c.tasks_completed);
        let no_processes = self.settings.processes.max(1) as u64;

        if timed_out_round {
            completed += no_processes;
            time_so_far += (timeout_hint * no_processes) as f64;
        }

        let etc = if completed == 0 {
            0.0
        } else {
            time_so_far / completed as f64 * remaining as f64 / no_processes as f64
        };
        info!(
            "{}/{} completed, ETC {}s",
            c.tasks_completed,
            c.tasks_total,
            etc.round() as u64
        );
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
