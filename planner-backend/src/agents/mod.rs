pub mod event_scout;
pub mod safety_review;
pub mod schedule_fit;

pub use event_scout::EventScoutTask;
pub use safety_review::SafetyReviewTask;
pub use schedule_fit::ScheduleFitTask;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PlannerError;
use crate::models::{ActivityRequest, TaskPayload};
use crate::providers::ProviderSet;

/// One specialist in the planning crew. Tasks are pure with respect to
/// their inputs: the same request against the same provider data produces
/// the same payload.
#[async_trait]
pub trait AgentTask: Send + Sync {
    /// Stable name used in result envelopes and task logs
    fn name(&self) -> &'static str;

    /// One-line description for startup logging
    fn description(&self) -> &'static str;

    async fn run(
        &self,
        request: &ActivityRequest,
        providers: &ProviderSet,
    ) -> Result<TaskPayload, PlannerError>;
}

/// Ordered collection of agent tasks. Registration order is the order
/// results are collected and reported in.
pub struct TaskRoster {
    tasks: Vec<Arc<dyn AgentTask>>,
}

impl TaskRoster {
    pub fn new() -> Self {
        TaskRoster { tasks: Vec::new() }
    }

    pub fn register(&mut self, task: Arc<dyn AgentTask>) {
        log::debug!("[roster] Registered task: {}", task.name());
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[Arc<dyn AgentTask>] {
        &self.tasks
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for TaskRoster {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a roster with the full planning crew in dispatch order
pub fn create_default_roster() -> TaskRoster {
    let mut roster = TaskRoster::new();
    roster.register(Arc::new(EventScoutTask::new()));
    roster.register(Arc::new(SafetyReviewTask::new()));
    roster.register(Arc::new(ScheduleFitTask::new()));
    roster
}
