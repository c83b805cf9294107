//! Safety review task
//!
//! Runs alongside the event scout, so it sees the request only. It turns
//! the child's age, interests, and special needs into safety and
//! accessibility guidance the synthesizer folds into the narrative.

use async_trait::async_trait;

use crate::agents::AgentTask;
use crate::error::PlannerError;
use crate::models::{ActivityRequest, Category, TaskPayload};
use crate::providers::ProviderSet;

fn age_bracket(age: u8) -> &'static str {
    match age {
        0..=3 => "toddler (ages 1-3)",
        4..=5 => "preschool (ages 3-5)",
        6..=11 => "elementary (ages 6-11)",
        12..=14 => "middle school (ages 11-14)",
        _ => "teen (ages 13-17)",
    }
}

fn category_checklist(category: Category) -> Option<&'static str> {
    match category {
        Category::Stem => Some(
            "STEM activities: check chemical and material safety, ensure proper supervision for experiments",
        ),
        Category::Sports => Some(
            "Sports activities: verify safety equipment and injury prevention protocols, confirm first aid availability",
        ),
        Category::Arts => Some(
            "Arts activities: check for safe art materials and proper ventilation",
        ),
        Category::Educational => Some(
            "Library and story programs: quiet, supervised settings with age-appropriate material",
        ),
        Category::Social => Some(
            "Community programs: verify staff background checks and supervision ratios",
        ),
        Category::General => None,
    }
}

fn accessibility_note(need: &str) -> String {
    let need_lower = need.to_lowercase();
    if need_lower.contains("wheelchair") || need_lower.contains("mobility") {
        "Wheelchair access: museums, libraries and community centers are typically accessible, contact other venues to confirm".to_string()
    } else if need_lower.contains("sensory") || need_lower.contains("autism") {
        "Sensory needs: libraries offer quiet environments, ask other venues about sensory accommodations".to_string()
    } else if need_lower.contains("learning") || need_lower.contains("adhd") {
        "Learning support: check whether each venue offers learning accommodations".to_string()
    } else {
        format!("Review '{}' requirements with each venue directly", need)
    }
}

pub struct SafetyReviewTask;

impl SafetyReviewTask {
    pub fn new() -> Self {
        SafetyReviewTask
    }
}

impl Default for SafetyReviewTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentTask for SafetyReviewTask {
    fn name(&self) -> &'static str {
        "safety_review"
    }

    fn description(&self) -> &'static str {
        "Reviews age, safety, and accessibility considerations for the request"
    }

    async fn run(
        &self,
        request: &ActivityRequest,
        _providers: &ProviderSet,
    ) -> Result<TaskPayload, PlannerError> {
        let mut payload = TaskPayload::new();

        payload.add_note(format!(
            "Age check: {} falls in the {} bracket",
            request.child_age,
            age_bracket(request.child_age)
        ));

        let mut covered = Vec::new();
        for interest in &request.interests {
            if let Some(category) = Category::from_interest(interest) {
                if covered.contains(&category) {
                    continue;
                }
                covered.push(category);
                if let Some(checklist) = category_checklist(category) {
                    payload.add_note(checklist.to_string());
                }
            }
        }
        if covered.is_empty() {
            payload.add_note(
                "Confirm adult supervision is adequate for the age group at each venue".to_string(),
            );
        }

        if request.special_needs.is_empty() {
            payload.add_note("No special accessibility requirements specified".to_string());
        } else {
            for need in &request.special_needs {
                payload.add_note(accessibility_note(need));
            }
        }

        Ok(payload)
    }
}
