//! Event scout task
//!
//! The one member of the crew that talks to providers. Venue programs are
//! collected first so the curated record wins when the feed returns the
//! same activity, then everything is merged, deduplicated by name, and
//! given an outbound link.

use async_trait::async_trait;

use crate::agents::AgentTask;
use crate::error::PlannerError;
use crate::models::{ActivityRequest, CandidateActivity, Category, TaskPayload};
use crate::providers::ProviderSet;

/// Map raw interest strings to planner categories, deduplicated in
/// request order. Unrecognized interests map to nothing rather than
/// widening the search.
fn interest_categories(interests: &[String]) -> Vec<Category> {
    let mut categories = Vec::new();
    for interest in interests {
        if let Some(category) = Category::from_interest(interest) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
    }
    categories
}

/// Build an outbound link for a candidate that arrived without one
fn search_link(candidate: &CandidateActivity, location: &str) -> String {
    let title = candidate.name.to_lowercase();
    let location_clean = location.replace(',', "");

    if title.contains("story") || title.contains("library") {
        format!(
            "https://www.facebook.com/events/search/?q={}",
            urlencoding::encode(&format!("story time {}", location_clean))
        )
    } else if title.contains("park") || title.contains("family fun") {
        format!(
            "https://www.facebook.com/events/search/?q={}",
            urlencoding::encode(&format!("family fun {}", location_clean))
        )
    } else if title.contains("museum") {
        format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(&format!("museums {} kids", location_clean))
        )
    } else if title.contains("workshop") || title.contains("class") {
        format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(&format!("{} {}", candidate.name, location_clean))
        )
    } else {
        format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(&format!("{} {} kids family", candidate.name, location_clean))
        )
    }
}

pub struct EventScoutTask;

impl EventScoutTask {
    pub fn new() -> Self {
        EventScoutTask
    }
}

impl Default for EventScoutTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentTask for EventScoutTask {
    fn name(&self) -> &'static str {
        "event_scout"
    }

    fn description(&self) -> &'static str {
        "Searches the events feed and venue catalog for candidate activities"
    }

    async fn run(
        &self,
        request: &ActivityRequest,
        providers: &ProviderSet,
    ) -> Result<TaskPayload, PlannerError> {
        let categories = interest_categories(&request.interests);

        let venues = providers
            .venues
            .search_venues(&request.location, &categories)
            .await;
        let events = providers
            .events
            .search_events(&request.location, &request.date_range, &categories)
            .await;

        let records_seen = venues.len() + events.len();
        log::debug!(
            "[event_scout] {} venue programs, {} feed events before merge",
            venues.len(),
            events.len()
        );

        let mut seen_names = Vec::new();
        let mut candidates: Vec<CandidateActivity> = Vec::new();
        for mut candidate in venues.into_iter().chain(events) {
            let key = candidate.name.to_lowercase();
            if seen_names.contains(&key) {
                continue;
            }
            seen_names.push(key);
            if candidate.link.is_none() {
                candidate.link = Some(search_link(&candidate, &request.location));
            }
            candidates.push(candidate);
        }

        let mut payload = TaskPayload::new();
        payload.add_note(format!(
            "Searched venue programs and the events feed, {} records found, {} after merging duplicates",
            records_seen,
            candidates.len()
        ));
        if categories.is_empty() {
            payload.add_note("No interest filter applied, searched all categories".to_string());
        } else {
            let labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
            payload.add_note(format!("Focused on interests: {}", labels.join(", ")));
        }
        payload = payload.with_candidates(candidates);
        payload.records_seen = records_seen;
        Ok(payload)
    }
}
