//! Final plan shapes returned across the request boundary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::activity::CandidateActivity;
use super::task::TaskStatus;

/// Ranked plan produced by the convergence step. Constructed once,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPlan {
    pub activities: Vec<CandidateActivity>,
    pub narrative_summary: String,
}

/// Candidate counts gathered during synthesis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total_found: usize,
    pub age_appropriate: usize,
    /// Category label -> count over the ranked plan. BTreeMap keeps the
    /// serialized order stable between identical requests.
    pub categories: BTreeMap<String, usize>,
}

/// One line of the per-request task log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLogEntry {
    pub task: String,
    pub status: TaskStatus,
    pub elapsed_ms: u64,
}

/// Everything the synthesizer hands back to the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedPlan {
    pub plan: ActivityPlan,
    pub stats: PlanStats,
    pub task_log: Vec<TaskLogEntry>,
}

/// Wire response for POST /api/discover-activities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub result: String,
    pub activities: Vec<CandidateActivity>,
    pub total_found: usize,
    pub age_appropriate: usize,
    pub categories: BTreeMap<String, usize>,
    pub task_log: Vec<TaskLogEntry>,
}

impl From<SynthesizedPlan> for DiscoverResponse {
    fn from(synthesized: SynthesizedPlan) -> Self {
        DiscoverResponse {
            result: synthesized.plan.narrative_summary,
            activities: synthesized.plan.activities,
            total_found: synthesized.stats.total_found,
            age_appropriate: synthesized.stats.age_appropriate,
            categories: synthesized.stats.categories,
            task_log: synthesized.task_log,
        }
    }
}
