//! Parallel task dispatcher
//!
//! Fans the roster out as one spawned task per agent, waits for every
//! result, and hands the synthesizer exactly one envelope per task in
//! roster order. Nothing is handed over early: a task that blows its
//! budget is recorded as a timeout while the rest keep running.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::agents::TaskRoster;
use crate::error::PlannerError;
use crate::models::{ActivityRequest, TaskResult};
use crate::providers::ProviderSet;

pub struct ParallelDispatcher {
    roster: Arc<TaskRoster>,
    providers: ProviderSet,
    task_timeout: Duration,
}

impl ParallelDispatcher {
    pub fn new(roster: Arc<TaskRoster>, providers: ProviderSet, task_timeout: Duration) -> Self {
        ParallelDispatcher {
            roster,
            providers,
            task_timeout,
        }
    }

    /// Run every roster task against the shared request. Always returns
    /// one result per task, in roster order, whatever each task did.
    pub async fn dispatch(
        &self,
        request: Arc<ActivityRequest>,
        cancel: &CancellationToken,
    ) -> Vec<TaskResult> {
        log::info!(
            "[dispatch] Running {} tasks in parallel, {}s budget each",
            self.roster.task_count(),
            self.task_timeout.as_secs()
        );

        let mut handles = Vec::with_capacity(self.roster.task_count());
        for task in self.roster.tasks() {
            let task = Arc::clone(task);
            let request = Arc::clone(&request);
            let providers = self.providers.clone();
            let budget = self.task_timeout;
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let name = task.name();
                let started = Instant::now();
                tokio::select! {
                    _ = cancel.cancelled() => {
                        let elapsed_ms = started.elapsed().as_millis() as u64;
                        log::warn!("[dispatch] {} cut off by the request deadline after {}ms", name, elapsed_ms);
                        TaskResult::timed_out(name, "request deadline reached", elapsed_ms)
                    }
                    outcome = tokio::time::timeout(budget, task.run(&request, &providers)) => {
                        let elapsed_ms = started.elapsed().as_millis() as u64;
                        match outcome {
                            Ok(Ok(payload)) => {
                                log::debug!("[dispatch] {} finished in {}ms", name, elapsed_ms);
                                TaskResult::ok(name, payload, elapsed_ms)
                            }
                            Ok(Err(e)) => {
                                if e.is_retryable() {
                                    log::warn!("[dispatch] {} failed after {}ms: {}", name, elapsed_ms, e);
                                } else {
                                    log::error!("[dispatch] {} hit an unexpected error after {}ms: {}", name, elapsed_ms, e);
                                }
                                TaskResult::errored(name, e.to_string(), elapsed_ms)
                            }
                            Err(_) => {
                                let e = PlannerError::TaskTimeout {
                                    task: name.to_string(),
                                    limit_secs: budget.as_secs(),
                                };
                                log::warn!("[dispatch] {}", e);
                                TaskResult::timed_out(name, e.to_string(), elapsed_ms)
                            }
                        }
                    }
                }
            }));
        }

        let names = self.roster.names();
        let mut results = Vec::with_capacity(handles.len());
        for (i, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    // A panicked task still gets its envelope
                    log::error!("[dispatch] {} panicked: {}", names[i], e);
                    results.push(TaskResult::errored(names[i], format!("task panicked: {}", e), 0));
                }
            }
        }
        results
    }
}
