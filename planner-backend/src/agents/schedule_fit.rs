//! Schedule fit task
//!
//! Pure request analysis: availability, travel estimates by neighborhood,
//! and the budget ceiling. Cross-referencing against actual candidate
//! schedules happens later in the synthesizer, after both parallel tasks
//! have reported.

use async_trait::async_trait;

use crate::agents::AgentTask;
use crate::error::PlannerError;
use crate::models::{ActivityRequest, TaskPayload};
use crate::providers::ProviderSet;

/// Drive-time estimate by neighborhood keyword
fn travel_estimate(neighborhood: &str) -> &'static str {
    let neighborhood = neighborhood.to_lowercase();
    if neighborhood.contains("downtown") {
        "15-20 minutes"
    } else if neighborhood.contains("midtown") {
        "10-15 minutes"
    } else if neighborhood.contains("eastside") {
        "20-25 minutes"
    } else if neighborhood.contains("westside") {
        "25-30 minutes"
    } else {
        "15-25 minutes"
    }
}

pub struct ScheduleFitTask;

impl ScheduleFitTask {
    pub fn new() -> Self {
        ScheduleFitTask
    }
}

impl Default for ScheduleFitTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentTask for ScheduleFitTask {
    fn name(&self) -> &'static str {
        "schedule_fit"
    }

    fn description(&self) -> &'static str {
        "Analyzes family availability, travel, and budget constraints"
    }

    async fn run(
        &self,
        request: &ActivityRequest,
        _providers: &ProviderSet,
    ) -> Result<TaskPayload, PlannerError> {
        let mut payload = TaskPayload::new();

        let days: Vec<String> = request.available_days.iter().map(|d| d.to_string()).collect();
        let times: Vec<String> = request.preferred_times.iter().map(|t| t.to_string()).collect();
        payload.add_note(format!(
            "Family is available on {} days, preferring {} slots",
            days.join(" and "),
            times.join(" and ")
        ));

        match request.neighborhood.as_deref() {
            Some(neighborhood) if !neighborhood.trim().is_empty() => {
                payload.add_note(format!(
                    "Travel from {}: expect {} each way",
                    neighborhood,
                    travel_estimate(neighborhood)
                ));
            }
            _ => {
                payload.add_note(format!(
                    "Travel within {}: expect {} each way",
                    request.location,
                    travel_estimate("")
                ));
            }
        }

        payload.add_note(format!(
            "Budget is {} (max ${} per activity, preferred: {})",
            request.budget_tier,
            request.budget_tier.max_price_dollars(),
            request.budget_tier.preference_label()
        ));

        Ok(payload)
    }
}
