//! Activity request schema and boundary validation

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Day-of-week window a family is available on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayWindow {
    Weekend,
    Weekday,
}

impl std::fmt::Display for DayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayWindow::Weekend => write!(f, "weekend"),
            DayWindow::Weekday => write!(f, "weekday"),
        }
    }
}

impl DayWindow {
    /// Which window a calendar day falls in
    pub fn of_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => DayWindow::Weekend,
            _ => DayWindow::Weekday,
        }
    }
}

/// Time-of-day window a family prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Morning,
    Afternoon,
    Evening,
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::Morning => write!(f, "morning"),
            TimeWindow::Afternoon => write!(f, "afternoon"),
            TimeWindow::Evening => write!(f, "evening"),
        }
    }
}

impl TimeWindow {
    /// Window a 24h clock hour falls in
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            0..=11 => TimeWindow::Morning,
            12..=16 => TimeWindow::Afternoon,
            _ => TimeWindow::Evening,
        }
    }
}

/// Family budget preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    Moderate,
    Premium,
}

impl Default for BudgetTier {
    fn default() -> Self {
        BudgetTier::Moderate
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetTier::Budget => write!(f, "budget"),
            BudgetTier::Moderate => write!(f, "moderate"),
            BudgetTier::Premium => write!(f, "premium"),
        }
    }
}

impl BudgetTier {
    /// Position on the budget < moderate < premium scale
    pub fn rank(&self) -> u8 {
        match self {
            BudgetTier::Budget => 0,
            BudgetTier::Moderate => 1,
            BudgetTier::Premium => 2,
        }
    }

    /// Per-activity spending ceiling in dollars
    pub fn max_price_dollars(&self) -> u32 {
        match self {
            BudgetTier::Budget => 15,
            BudgetTier::Moderate => 30,
            BudgetTier::Premium => 50,
        }
    }

    /// Short label for narrative text
    pub fn preference_label(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "Free",
            BudgetTier::Moderate => "Under $20",
            BudgetTier::Premium => "Any price",
        }
    }
}

/// Named search window for event lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "next_2_weeks")]
    NextTwoWeeks,
    #[serde(rename = "this_weekend")]
    ThisWeekend,
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::NextTwoWeeks
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateRange::NextTwoWeeks => write!(f, "next_2_weeks"),
            DateRange::ThisWeekend => write!(f, "this_weekend"),
        }
    }
}

impl DateRange {
    /// Resolve the named window to inclusive (start, end) dates from `today`
    pub fn resolve_from(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            DateRange::NextTwoWeeks => (today, today + Duration::days(14)),
            DateRange::ThisWeekend => {
                let days_until_sat =
                    (Weekday::Sat.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
                let saturday = today + Duration::days(days_until_sat as i64);
                (saturday, saturday + Duration::days(1))
            }
        }
    }

    /// Resolve against the current date
    pub fn resolve(&self) -> (NaiveDate, NaiveDate) {
        self.resolve_from(Utc::now().date_naive())
    }
}

fn default_available_days() -> Vec<DayWindow> {
    vec![DayWindow::Weekend]
}

fn default_preferred_times() -> Vec<TimeWindow> {
    vec![TimeWindow::Morning, TimeWindow::Afternoon]
}

/// Inbound request for the discover-activities operation.
///
/// Immutable once accepted at the boundary; every agent task sees the same
/// shared view and none of them may mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub child_age: u8,
    pub location: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub special_needs: Vec<String>,
    #[serde(default = "default_available_days")]
    pub available_days: Vec<DayWindow>,
    #[serde(default = "default_preferred_times")]
    pub preferred_times: Vec<TimeWindow>,
    #[serde(default)]
    pub budget_tier: BudgetTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub date_range: DateRange,
}

/// Maximum supported child age
pub const MAX_CHILD_AGE: u8 = 17;

impl ActivityRequest {
    /// Validate the request at the boundary. Failures here are rejected with
    /// HTTP 400 and never reach the dispatcher.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.child_age > MAX_CHILD_AGE {
            return Err(PlannerError::Validation(format!(
                "child_age must be between 0 and {}, got {}",
                MAX_CHILD_AGE, self.child_age
            )));
        }
        if self.location.trim().is_empty() {
            return Err(PlannerError::Validation(
                "location must not be empty".to_string(),
            ));
        }
        if !Self::is_supported_location(&self.location) {
            return Err(PlannerError::Validation(
                "This service is currently focused on Cleveland, Ohio. Please enter 'Cleveland, OH' or 'Cleveland, Ohio' to continue.".to_string(),
            ));
        }
        Ok(())
    }

    /// Coverage check for the shipped catalogs (Cleveland metro only)
    pub fn is_supported_location(location: &str) -> bool {
        let lower = location.to_lowercase();
        if lower.contains("cleveland") || lower.contains("ohio") {
            return true;
        }
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| token == "oh")
    }

    pub fn matches_day(&self, day: DayWindow) -> bool {
        self.available_days.contains(&day)
    }

    pub fn matches_time(&self, time: TimeWindow) -> bool {
        self.preferred_times.contains(&time)
    }
}
