//! Agent task results collected by the dispatcher

use serde::{Deserialize, Serialize};

use super::activity::CandidateActivity;

/// Terminal state of one dispatched agent task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Ok,
    Error,
    Timeout,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Ok => write!(f, "ok"),
            TaskStatus::Error => write!(f, "error"),
            TaskStatus::Timeout => write!(f, "timeout"),
        }
    }
}

impl TaskStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, TaskStatus::Ok)
    }
}

/// Substantive output of a successful agent task: zero or more candidates
/// plus note lines for the final narrative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(default)]
    pub candidates: Vec<CandidateActivity>,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Records seen before any filtering, for the total_found count
    #[serde(default)]
    pub records_seen: usize,
}

impl TaskPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, candidates: Vec<CandidateActivity>) -> Self {
        self.records_seen = candidates.len();
        self.candidates = candidates;
        self
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// Envelope for one agent task's outcome. Exactly one of these exists per
/// dispatched task, whatever happened to the task itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<TaskPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub elapsed_ms: u64,
}

impl TaskResult {
    pub fn ok(task_name: impl Into<String>, payload: TaskPayload, elapsed_ms: u64) -> Self {
        TaskResult {
            task_name: task_name.into(),
            status: TaskStatus::Ok,
            payload: Some(payload),
            error_detail: None,
            elapsed_ms,
        }
    }

    pub fn errored(task_name: impl Into<String>, detail: impl Into<String>, elapsed_ms: u64) -> Self {
        TaskResult {
            task_name: task_name.into(),
            status: TaskStatus::Error,
            payload: None,
            error_detail: Some(detail.into()),
            elapsed_ms,
        }
    }

    pub fn timed_out(task_name: impl Into<String>, detail: impl Into<String>, elapsed_ms: u64) -> Self {
        TaskResult {
            task_name: task_name.into(),
            status: TaskStatus::Timeout,
            payload: None,
            error_detail: Some(detail.into()),
            elapsed_ms,
        }
    }
}
