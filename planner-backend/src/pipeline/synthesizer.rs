//! Plan synthesizer
//!
//! The convergence step. Takes the full set of task envelopes, merges
//! candidates, filters by age, ranks, and writes the parent-facing
//! narrative. Synthesis is a pure function of the request and the task
//! results: the same inputs always produce the same plan, and a plan is
//! produced even when every task failed.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::models::{
    ActivityPlan, ActivityRequest, CandidateActivity, PlanStats, SynthesizedPlan, TaskLogEntry,
    TaskResult,
};

/// Upper bound on ranked activities in a plan
const MAX_PLAN_ACTIVITIES: usize = 10;

/// Parent-facing explanation for a task that produced no payload
fn absence_note(task_name: &str) -> String {
    match task_name {
        "event_scout" => "Event data was unavailable for this plan.".to_string(),
        "safety_review" => {
            "The safety review did not complete, double-check venue guidance yourself.".to_string()
        }
        "schedule_fit" => "Schedule analysis did not complete.".to_string(),
        other => format!("The {} task did not complete.", other),
    }
}

fn matches_schedule(request: &ActivityRequest, candidate: &CandidateActivity) -> bool {
    let day_ok = candidate
        .schedule_window
        .day_window()
        .map(|d| request.matches_day(d))
        .unwrap_or(false);
    let time_ok = candidate
        .schedule_window
        .time_window()
        .map(|t| request.matches_time(t))
        .unwrap_or(false);
    day_ok && time_ok
}

pub struct ConvergenceSynthesizer;

impl ConvergenceSynthesizer {
    pub fn new() -> Self {
        ConvergenceSynthesizer
    }

    pub fn synthesize(&self, request: &ActivityRequest, results: &[TaskResult]) -> SynthesizedPlan {
        let task_log: Vec<TaskLogEntry> = results
            .iter()
            .map(|r| TaskLogEntry {
                task: r.task_name.clone(),
                status: r.status,
                elapsed_ms: r.elapsed_ms,
            })
            .collect();

        let mut absence_notes = Vec::new();
        let mut task_notes = Vec::new();
        let mut merged: Vec<CandidateActivity> = Vec::new();
        let mut seen_names: Vec<String> = Vec::new();
        let mut total_found = 0usize;

        for result in results {
            match &result.payload {
                Some(payload) if result.status.is_ok() => {
                    total_found += payload.records_seen;
                    task_notes.extend(payload.notes.iter().cloned());
                    for candidate in &payload.candidates {
                        let key = candidate.name.to_lowercase();
                        if !seen_names.contains(&key) {
                            seen_names.push(key);
                            merged.push(candidate.clone());
                        }
                    }
                }
                _ => absence_notes.push(absence_note(&result.task_name)),
            }
        }

        let eligible: Vec<CandidateActivity> = merged
            .into_iter()
            .filter(|c| c.fits_age(request.child_age))
            .collect();
        let age_appropriate = eligible.len();

        // Rank: best age fit first, then closest budget band, then the
        // preferred source, then original discovery order
        let mut indexed: Vec<(usize, CandidateActivity)> = eligible.into_iter().enumerate().collect();
        indexed.sort_by_key(|(idx, c)| {
            (
                Reverse(c.age_fit_score(request.child_age)),
                c.budget_distance(request.budget_tier),
                c.source.priority(),
                *idx,
            )
        });
        let ranked: Vec<CandidateActivity> = indexed
            .into_iter()
            .map(|(_, c)| c)
            .take(MAX_PLAN_ACTIVITIES)
            .collect();

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for candidate in &ranked {
            *categories.entry(candidate.category.to_string()).or_insert(0) += 1;
        }

        let narrative_summary =
            self.write_narrative(request, &ranked, total_found, age_appropriate, &task_notes, &absence_notes);

        log::info!(
            "[synth] {} found, {} age-appropriate, {} in plan, {} task notes",
            total_found,
            age_appropriate,
            ranked.len(),
            task_notes.len()
        );

        SynthesizedPlan {
            plan: ActivityPlan {
                activities: ranked,
                narrative_summary,
            },
            stats: PlanStats {
                total_found,
                age_appropriate,
                categories,
            },
            task_log,
        }
    }

    fn write_narrative(
        &self,
        request: &ActivityRequest,
        ranked: &[CandidateActivity],
        total_found: usize,
        age_appropriate: usize,
        task_notes: &[String],
        absence_notes: &[String],
    ) -> String {
        let mut lines = Vec::new();

        if total_found == 0 {
            lines.push(format!(
                "We didn't find any activities for your {}-year-old in {} this time.",
                request.child_age, request.location
            ));
        } else {
            lines.push(format!(
                "Found {} activities for your {}-year-old in {}, {} of them age-appropriate.",
                total_found, request.child_age, request.location, age_appropriate
            ));
        }

        if age_appropriate == 0 && total_found > 0 {
            lines.push(
                "None matched the age range well enough to recommend, consider widening the interests."
                    .to_string(),
            );
        }

        if !ranked.is_empty() {
            let picks: Vec<String> = ranked
                .iter()
                .take(3)
                .map(|c| format!("{} at {} ({})", c.name, c.venue, c.price_label))
                .collect();
            lines.push(format!("Top picks: {}.", picks.join(", ")));

            let scheduled = ranked
                .iter()
                .filter(|c| matches_schedule(request, c))
                .count();
            lines.push(format!(
                "{} of the {} planned activities fall on your preferred days and times.",
                scheduled,
                ranked.len()
            ));

            let within = ranked
                .iter()
                .filter(|c| c.within_budget(request.budget_tier))
                .count();
            lines.push(format!(
                "{} fit your {} budget (max ${} per activity).",
                within,
                request.budget_tier,
                request.budget_tier.max_price_dollars()
            ));

            if !request.special_needs.is_empty() {
                let accommodating = ranked
                    .iter()
                    .filter(|c| c.covers_needs(&request.special_needs))
                    .count();
                if accommodating > 0 {
                    lines.push(format!(
                        "{} list accommodations matching your accessibility needs.",
                        accommodating
                    ));
                } else {
                    lines.push(
                        "Contact each venue directly about your accessibility needs.".to_string(),
                    );
                }
            }
        }

        lines.extend(task_notes.iter().cloned());
        lines.extend(absence_notes.iter().cloned());

        if lines.is_empty() {
            // Unreachable today (the headline is unconditional), kept so the
            // narrative can never be empty
            lines.push("No activity data available right now, please try again shortly.".to_string());
        }

        lines.join("\n")
    }
}

impl Default for ConvergenceSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivitySource, BudgetTier, Category, PriceTier, ScheduleWindow, TaskPayload,
    };

    fn request(json: serde_json::Value) -> ActivityRequest {
        serde_json::from_value(json).unwrap()
    }

    fn cleveland_request() -> ActivityRequest {
        request(serde_json::json!({
            "child_age": 8,
            "location": "Cleveland, OH",
            "interests": ["science"],
            "budget_tier": "moderate"
        }))
    }

    fn candidate(
        name: &str,
        category: Category,
        ages: (u8, u8),
        price: (&str, PriceTier),
        source: ActivitySource,
    ) -> CandidateActivity {
        CandidateActivity {
            name: name.to_string(),
            category,
            min_age: ages.0,
            max_age: ages.1,
            price_tier: price.1,
            price_label: price.0.to_string(),
            venue: "Science Center".to_string(),
            address: "601 Erieside Ave, Cleveland, OH".to_string(),
            schedule_window: ScheduleWindow::new("2025-01-18", "10:00 AM"),
            accessibility_flags: vec![],
            link: Some("https://example.test".to_string()),
            source,
        }
    }

    fn scout_result(candidates: Vec<CandidateActivity>) -> TaskResult {
        TaskResult::ok(
            "event_scout",
            TaskPayload::new().with_candidates(candidates),
            120,
        )
    }

    #[test]
    fn test_all_tasks_failed_still_produces_plan() {
        let results = vec![
            TaskResult::timed_out("event_scout", "exceeded 8s task budget", 8000),
            TaskResult::errored("safety_review", "boom", 10),
            TaskResult::timed_out("schedule_fit", "exceeded 8s task budget", 8000),
        ];

        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);

        assert!(plan.plan.activities.is_empty());
        assert!(!plan.plan.narrative_summary.is_empty());
        assert!(plan.plan.narrative_summary.contains("Event data was unavailable"));
        assert_eq!(plan.stats.total_found, 0);
        assert_eq!(plan.task_log.len(), 3);
    }

    #[test]
    fn test_age_filter_and_counts() {
        let results = vec![scout_result(vec![
            candidate("Fits", Category::Stem, (6, 12), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
            candidate("Too Old", Category::Stem, (13, 17), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
        ])];

        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);

        assert_eq!(plan.stats.total_found, 2);
        assert_eq!(plan.stats.age_appropriate, 1);
        assert_eq!(plan.plan.activities.len(), 1);
        assert_eq!(plan.plan.activities[0].name, "Fits");
        assert!(plan.plan.activities.iter().all(|c| c.min_age <= 8 && 8 <= c.max_age));
    }

    #[test]
    fn test_ranking_age_fit_then_budget_then_source() {
        // Centered on age 8 vs edge-of-range, same price band
        let results = vec![scout_result(vec![
            candidate("Edge", Category::Stem, (8, 14), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
            candidate("Centered", Category::Stem, (6, 10), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
        ])];
        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);
        assert_eq!(plan.plan.activities[0].name, "Centered");

        // Same fit, budget distance decides, and flips with the tier
        let make = |tier| {
            let results = vec![scout_result(vec![
                candidate("Pricey", Category::Stem, (6, 10), ("$45", PriceTier::High), ActivitySource::VenueCatalog),
                candidate("Cheap", Category::Stem, (6, 10), ("Free", PriceTier::Free), ActivitySource::VenueCatalog),
            ])];
            let req = request(serde_json::json!({
                "child_age": 8,
                "location": "Cleveland, OH",
                "budget_tier": tier
            }));
            ConvergenceSynthesizer::new().synthesize(&req, &results)
        };
        assert_eq!(make("budget").plan.activities[0].name, "Cheap");
        assert_eq!(make("premium").plan.activities[0].name, "Pricey");

        // Same fit and budget: curated venue record outranks the feed
        let results = vec![scout_result(vec![
            candidate("Feed Pick", Category::Stem, (6, 10), ("$15", PriceTier::Low), ActivitySource::EventsFeed),
            candidate("Venue Pick", Category::Stem, (6, 10), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
        ])];
        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);
        assert_eq!(plan.plan.activities[0].name, "Venue Pick");

        // Full tie keeps discovery order
        let results = vec![scout_result(vec![
            candidate("First Seen", Category::Stem, (6, 10), ("$15", PriceTier::Low), ActivitySource::Fallback),
            candidate("Second Seen", Category::Stem, (6, 10), ("$15", PriceTier::Low), ActivitySource::Fallback),
        ])];
        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);
        assert_eq!(plan.plan.activities[0].name, "First Seen");
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let results = vec![
            scout_result(vec![
                candidate("A", Category::Stem, (6, 12), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
                candidate("B", Category::Arts, (4, 10), ("Free", PriceTier::Free), ActivitySource::Fallback),
            ]),
            TaskResult::errored("safety_review", "boom", 5),
        ];
        let req = cleveland_request();

        let synthesizer = ConvergenceSynthesizer::new();
        let first = serde_json::to_value(synthesizer.synthesize(&req, &results)).unwrap();
        let second = serde_json::to_value(synthesizer.synthesize(&req, &results)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cleveland_scenario_narrative_and_stats() {
        let mut scout_payload = TaskPayload::new().with_candidates(vec![
            candidate("Kids Science Workshop", Category::Stem, (6, 12), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
            candidate("Dance Party", Category::Arts, (5, 12), ("$20", PriceTier::Medium), ActivitySource::Fallback),
            candidate("Teen Coding Camp", Category::Stem, (13, 17), ("$30", PriceTier::Medium), ActivitySource::Fallback),
        ]);
        scout_payload.add_note("Searched venue programs and the events feed, 3 records found".to_string());
        let mut safety_payload = TaskPayload::new();
        safety_payload.add_note("Age check: 8 falls in the elementary (ages 6-11) bracket".to_string());

        let results = vec![
            TaskResult::ok("event_scout", scout_payload, 130),
            TaskResult::ok("safety_review", safety_payload, 2),
            TaskResult::timed_out("schedule_fit", "exceeded 8s task budget", 8000),
        ];

        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);

        assert_eq!(plan.stats.total_found, 3);
        assert_eq!(plan.stats.age_appropriate, 2);
        assert_eq!(plan.plan.activities[0].name, "Kids Science Workshop");
        assert_eq!(plan.stats.categories.get("STEM"), Some(&1));
        assert_eq!(plan.stats.categories.get("Arts"), Some(&1));

        let narrative = &plan.plan.narrative_summary;
        assert!(narrative.contains("8-year-old"));
        assert!(narrative.contains("Cleveland"));
        assert!(narrative.contains("Top picks"));
        assert!(narrative.contains("elementary"));
        assert!(narrative.contains("Schedule analysis did not complete."));

        // One log line per dispatched task, in order
        let logged: Vec<&str> = plan.task_log.iter().map(|e| e.task.as_str()).collect();
        assert_eq!(logged, vec!["event_scout", "safety_review", "schedule_fit"]);
    }

    #[test]
    fn test_duplicate_candidates_from_payloads_collapse() {
        let results = vec![scout_result(vec![
            candidate("Family Day", Category::Stem, (6, 12), ("$15", PriceTier::Low), ActivitySource::VenueCatalog),
            candidate("family day", Category::Stem, (6, 12), ("$15", PriceTier::Low), ActivitySource::EventsFeed),
        ])];

        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &results);
        assert_eq!(plan.plan.activities.len(), 1);
        assert_eq!(plan.plan.activities[0].source, ActivitySource::VenueCatalog);
    }

    #[test]
    fn test_plan_caps_at_limit() {
        let many: Vec<CandidateActivity> = (0..15)
            .map(|i| {
                candidate(
                    &format!("Activity {}", i),
                    Category::Stem,
                    (6, 12),
                    ("$15", PriceTier::Low),
                    ActivitySource::Fallback,
                )
            })
            .collect();
        let plan = ConvergenceSynthesizer::new().synthesize(&cleveland_request(), &[scout_result(many)]);
        assert_eq!(plan.plan.activities.len(), MAX_PLAN_ACTIVITIES);
        assert_eq!(plan.stats.age_appropriate, 15);
    }
}
