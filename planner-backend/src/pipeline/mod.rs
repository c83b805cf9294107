//! Request pipeline
//!
//! One discovery request moves through four phases: received, dispatched,
//! synthesized, returned. Each transition is logged with the request id so
//! a slow or failed request can be reconstructed from the log alone.

pub mod dispatcher;
pub mod synthesizer;

pub use dispatcher::ParallelDispatcher;
pub use synthesizer::ConvergenceSynthesizer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::PlannerError;
use crate::models::{ActivityRequest, SynthesizedPlan};

/// Lifecycle phase of one discovery request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    Dispatched,
    Synthesized,
    Returned,
}

impl std::fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestPhase::Received => write!(f, "received"),
            RequestPhase::Dispatched => write!(f, "dispatched"),
            RequestPhase::Synthesized => write!(f, "synthesized"),
            RequestPhase::Returned => write!(f, "returned"),
        }
    }
}

/// Stable id plus phase markers for one request
struct RequestTrace {
    id: Uuid,
    started: Instant,
}

impl RequestTrace {
    fn begin() -> Self {
        let trace = RequestTrace {
            id: Uuid::new_v4(),
            started: Instant::now(),
        };
        trace.mark(RequestPhase::Received);
        trace
    }

    fn mark(&self, phase: RequestPhase) {
        log::info!(
            "[pipeline] {} phase={} elapsed_ms={}",
            self.id,
            phase,
            self.started.elapsed().as_millis()
        );
    }
}

/// Dispatch plus synthesis behind one entry point. The global deadline
/// lives here: when it fires, the cancellation token sweeps every
/// still-running task into a timeout envelope.
pub struct PlannerPipeline {
    dispatcher: ParallelDispatcher,
    synthesizer: ConvergenceSynthesizer,
    request_timeout: Duration,
}

impl PlannerPipeline {
    pub fn new(
        dispatcher: ParallelDispatcher,
        synthesizer: ConvergenceSynthesizer,
        request_timeout: Duration,
    ) -> Self {
        PlannerPipeline {
            dispatcher,
            synthesizer,
            request_timeout,
        }
    }

    pub async fn run(&self, request: ActivityRequest) -> Result<SynthesizedPlan, PlannerError> {
        let trace = RequestTrace::begin();
        let request = Arc::new(request);

        let cancel = CancellationToken::new();
        let deadline = cancel.clone();
        let request_timeout = self.request_timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(request_timeout).await;
            log::warn!("[pipeline] Request deadline of {}s reached", request_timeout.as_secs());
            deadline.cancel();
        });

        let results = self.dispatcher.dispatch(Arc::clone(&request), &cancel).await;
        timer.abort();
        trace.mark(RequestPhase::Dispatched);

        let synthesized = self.synthesizer.synthesize(&request, &results);
        trace.mark(RequestPhase::Synthesized);

        if synthesized.plan.narrative_summary.trim().is_empty() {
            return Err(PlannerError::Synthesis(
                "synthesis produced an empty narrative".to_string(),
            ));
        }

        trace.mark(RequestPhase::Returned);
        Ok(synthesized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::create_default_roster;
    use crate::models::{
        ActivitySource, CandidateActivity, Category, DateRange, PriceTier, ScheduleWindow,
        TaskStatus,
    };
    use crate::providers::test_support::NoVenues;
    use crate::providers::{EventSearch, ProviderSet};
    use async_trait::async_trait;

    struct StubEvents {
        delay: Duration,
    }

    #[async_trait]
    impl EventSearch for StubEvents {
        async fn search_events(
            &self,
            _location: &str,
            _date_range: &DateRange,
            _categories: &[Category],
        ) -> Vec<CandidateActivity> {
            tokio::time::sleep(self.delay).await;
            vec![CandidateActivity {
                name: "Kids Science Workshop".to_string(),
                category: Category::Stem,
                min_age: 6,
                max_age: 12,
                price_tier: PriceTier::Low,
                price_label: "$15".to_string(),
                venue: "Science Center".to_string(),
                address: "601 Erieside Ave, Cleveland, OH".to_string(),
                schedule_window: ScheduleWindow::new("2025-01-18", "10:00 AM"),
                accessibility_flags: vec![],
                link: None,
                source: ActivitySource::Fallback,
            }]
        }
    }

    fn pipeline(event_delay: Duration, task_timeout: Duration, request_timeout: Duration) -> PlannerPipeline {
        let providers = ProviderSet::new(
            Arc::new(StubEvents { delay: event_delay }),
            Arc::new(NoVenues),
        );
        let dispatcher = ParallelDispatcher::new(
            Arc::new(create_default_roster()),
            providers,
            task_timeout,
        );
        PlannerPipeline::new(dispatcher, ConvergenceSynthesizer::new(), request_timeout)
    }

    fn request() -> ActivityRequest {
        serde_json::from_value(serde_json::json!({
            "child_age": 8,
            "location": "Cleveland, OH",
            "interests": ["science"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_pipeline_produces_ranked_plan() {
        let p = pipeline(
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(20),
        );

        let synthesized = p.run(request()).await.unwrap();

        assert_eq!(synthesized.task_log.len(), 3);
        assert!(synthesized.task_log.iter().all(|e| e.status == TaskStatus::Ok));
        assert_eq!(synthesized.plan.activities.len(), 1);
        assert_eq!(synthesized.plan.activities[0].name, "Kids Science Workshop");
        assert!(!synthesized.plan.narrative_summary.is_empty());
    }

    #[tokio::test]
    async fn test_request_deadline_sweeps_slow_tasks() {
        // Event provider sleeps far past the global deadline while the
        // per-task budget is even larger, so only the deadline can fire
        let p = pipeline(
            Duration::from_secs(30),
            Duration::from_secs(60),
            Duration::from_millis(50),
        );

        let started = Instant::now();
        let synthesized = p.run(request()).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(synthesized.task_log[0].status, TaskStatus::Timeout);
        assert!(synthesized.plan.activities.is_empty());
        assert!(synthesized
            .plan
            .narrative_summary
            .contains("Event data was unavailable"));
    }
}
