//! Candidate activity records and their classification helpers

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::request::{BudgetTier, DayWindow, TimeWindow, MAX_CHILD_AGE};

/// Interest category an activity is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "STEM")]
    Stem,
    Arts,
    Sports,
    Educational,
    Social,
    General,
}

/// Keyword table mapping family interests to categories. First match wins,
/// checked in this order.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Stem, &["science", "coding", "technology", "math", "engineering"]),
    (Category::Arts, &["art", "craft", "dance", "music", "creative", "painting"]),
    (Category::Sports, &["soccer", "basketball", "swimming", "tennis", "fitness"]),
    (Category::Educational, &["library", "reading", "story", "learning", "book"]),
    (Category::Social, &["play", "party", "group", "community", "friends"]),
];

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Stem => write!(f, "STEM"),
            Category::Arts => write!(f, "Arts"),
            Category::Sports => write!(f, "Sports"),
            Category::Educational => write!(f, "Educational"),
            Category::Social => write!(f, "Social"),
            Category::General => write!(f, "General"),
        }
    }
}

impl Category {
    /// Map a stated interest ("science", "dance club") to a category
    pub fn from_interest(interest: &str) -> Option<Category> {
        let lower = interest.to_lowercase();
        for (category, keywords) in CATEGORY_KEYWORDS {
            if keywords.iter().any(|k| lower.contains(k)) {
                return Some(*category);
            }
        }
        None
    }

    /// Classify free text (title + description) by the same keyword table
    pub fn classify(text: &str) -> Category {
        Self::from_interest(text).unwrap_or(Category::General)
    }

    /// Parse a catalog category label, tolerating free-form variants like
    /// "Arts & Culture" or "Nature & Education"
    pub fn from_label(label: &str) -> Category {
        let lower = label.to_lowercase();
        if lower.contains("stem") || lower.contains("science") {
            Category::Stem
        } else if lower.contains("art") || lower.contains("music") || lower.contains("theater") {
            Category::Arts
        } else if lower.contains("sport") {
            Category::Sports
        } else if lower.contains("education") || lower.contains("library") || lower.contains("reading") {
            Category::Educational
        } else if lower.contains("social") || lower.contains("community") || lower.contains("family") {
            Category::Social
        } else {
            Category::General
        }
    }

    /// Upstream events-feed category names to query for this category
    pub fn feed_categories(&self) -> &'static [&'static str] {
        match self {
            Category::Stem => &["conferences", "expos", "community", "education"],
            Category::Arts => &["performing-arts", "community", "expos", "festivals"],
            Category::Sports => &["sports", "community"],
            Category::Educational => &["conferences", "expos", "community", "education"],
            Category::Social => &["community", "festivals", "performing-arts"],
            Category::General => &["community", "festivals", "performing-arts", "education", "expos"],
        }
    }
}

/// Price band an activity falls in, ordered cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Free,
    Low,
    Medium,
    High,
}

static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").expect("price pattern"));

impl PriceTier {
    /// Parse a display price ("Free", "$15", "$15-50") into a band. Ranges
    /// are banded by their lower bound, same as the upstream estimates.
    pub fn parse(label: &str) -> PriceTier {
        if label.trim().eq_ignore_ascii_case("free") || label.trim().is_empty() {
            return PriceTier::Free;
        }
        match PRICE_RE
            .captures(label)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            Some(0) => PriceTier::Free,
            Some(d) if d <= 15 => PriceTier::Low,
            Some(d) if d <= 30 => PriceTier::Medium,
            Some(_) => PriceTier::High,
            // Unparseable prices are assumed affordable
            None => PriceTier::Free,
        }
    }

    /// Position on the same scale as BudgetTier::rank (Free and Low both
    /// count as budget-level)
    pub fn rank(&self) -> u8 {
        match self {
            PriceTier::Free | PriceTier::Low => 0,
            PriceTier::Medium => 1,
            PriceTier::High => 2,
        }
    }
}

/// Where a candidate came from; lower priority ranks first among ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    VenueCatalog,
    EventsFeed,
    Fallback,
}

impl ActivitySource {
    pub fn priority(&self) -> u8 {
        match self {
            ActivitySource::VenueCatalog => 0,
            ActivitySource::EventsFeed => 1,
            ActivitySource::Fallback => 2,
        }
    }
}

/// When an activity runs: a calendar date plus a start time label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    /// ISO date ("2024-01-20") or a recurring label ("Saturdays")
    pub date: String,
    /// Start time label ("10:00 AM")
    pub time: String,
}

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)").expect("time pattern")
});

impl ScheduleWindow {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// Which day window the date falls in, if it can be read
    pub fn day_window(&self) -> Option<DayWindow> {
        use chrono::{Datelike, NaiveDate};
        if let Ok(date) = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            return Some(DayWindow::of_weekday(date.weekday()));
        }
        let lower = self.date.to_lowercase();
        if lower.contains("saturday") || lower.contains("sunday") || lower.contains("weekend") {
            Some(DayWindow::Weekend)
        } else if ["monday", "tuesday", "wednesday", "thursday", "friday", "weekday"]
            .iter()
            .any(|d| lower.contains(d))
        {
            Some(DayWindow::Weekday)
        } else {
            None
        }
    }

    /// Which time window the start time falls in, if it can be read
    pub fn time_window(&self) -> Option<TimeWindow> {
        let caps = TIME_RE.captures(&self.time)?;
        let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let meridiem = caps.get(3)?.as_str().to_lowercase();
        if hour == 12 {
            hour = 0;
        }
        if meridiem == "pm" {
            hour += 12;
        }
        Some(TimeWindow::of_hour(hour))
    }
}

/// One recommended activity before final ranking. Read-only once produced
/// by a provider or agent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateActivity {
    pub name: String,
    pub category: Category,
    pub min_age: u8,
    pub max_age: u8,
    pub price_tier: PriceTier,
    /// Display price as published ("Free", "$15")
    pub price_label: String,
    pub venue: String,
    /// Street address families can navigate to
    pub address: String,
    pub schedule_window: ScheduleWindow,
    #[serde(default)]
    pub accessibility_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub source: ActivitySource,
}

impl CandidateActivity {
    /// Whether the child's age sits inside the posted range
    pub fn fits_age(&self, child_age: u8) -> bool {
        self.min_age <= child_age && child_age <= self.max_age
    }

    /// Age-fit score on a 0-100 scale: 0 outside the posted range, 100 at
    /// its center, tapering to 60 at the edges. Integer math keeps ranking
    /// deterministic.
    pub fn age_fit_score(&self, child_age: u8) -> u8 {
        if !self.fits_age(child_age) {
            return 0;
        }
        let span = (self.max_age - self.min_age) as u32;
        if span == 0 {
            return 100;
        }
        let off_center =
            (2 * child_age as i32 - (self.min_age as i32 + self.max_age as i32)).unsigned_abs();
        let taper = (off_center * 40 / span).min(40);
        (100 - taper) as u8
    }

    /// Distance between this activity's price band and the family budget
    pub fn budget_distance(&self, tier: BudgetTier) -> u8 {
        self.price_tier.rank().abs_diff(tier.rank())
    }

    /// Whether the price band sits within the family's spending ceiling
    pub fn within_budget(&self, tier: BudgetTier) -> bool {
        self.price_tier.rank() <= tier.rank()
    }

    /// Whether the requested special needs are covered by the posted
    /// accessibility flags
    pub fn covers_needs(&self, special_needs: &[String]) -> bool {
        special_needs.iter().all(|need| {
            let need_lower = need.to_lowercase();
            self.accessibility_flags
                .iter()
                .any(|flag| flag.to_lowercase().contains(&need_lower))
        })
    }
}

/// Parse a posted age range ("6-12 years") into (min, max). "All ages"
/// spans the full supported range; anything unreadable gets the
/// conservative elementary band.
pub fn parse_age_range(raw: &str) -> (u8, u8) {
    static AGE_RANGE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").expect("age range pattern"));

    if raw.to_lowercase().contains("all ages") {
        return (0, MAX_CHILD_AGE);
    }
    if let Some(caps) = AGE_RANGE_RE.captures(raw) {
        let min: u8 = caps[1].parse().unwrap_or(0);
        let max: u8 = caps[2].parse().unwrap_or(MAX_CHILD_AGE);
        if min <= max {
            return (min, max.min(MAX_CHILD_AGE));
        }
    }
    (5, 12)
}
