//! Static activity catalogs
//!
//! Two RON data files ship with the service: `activity_catalog.ron` holds
//! the generic fallback events the live feed degrades to, and
//! `venue_catalog.ron` holds curated local venue programs. Both are loaded
//! once at startup and injected wherever candidates are needed, which keeps
//! every lookup deterministic for tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::PlannerError;
use crate::models::{
    parse_age_range, ActivityRequest, ActivitySource, CandidateActivity, Category, PriceTier,
    ScheduleWindow,
};
use crate::providers::VenueSearch;

/// One record in a catalog data file
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: String,
    pub venue: String,
    pub address: String,
    pub date: String,
    pub time: String,
    pub age_range: String,
    pub price: String,
    pub description: String,
    #[serde(default)]
    pub accessibility: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl CatalogEntry {
    /// Convert to a candidate, resolving the free-form category label and
    /// parsing the posted age range and price
    pub fn to_candidate(&self, source: ActivitySource) -> CandidateActivity {
        let category = match Category::from_label(&self.category) {
            Category::General => {
                Category::classify(&format!("{} {}", self.name, self.description))
            }
            resolved => resolved,
        };
        let (min_age, max_age) = parse_age_range(&self.age_range);
        CandidateActivity {
            name: self.name.clone(),
            category,
            min_age,
            max_age,
            price_tier: PriceTier::parse(&self.price),
            price_label: self.price.clone(),
            venue: self.venue.clone(),
            address: self.address.clone(),
            schedule_window: ScheduleWindow::new(self.date.clone(), self.time.clone()),
            accessibility_flags: self.accessibility.clone(),
            link: self.link.clone(),
            source,
        }
    }
}

fn load_entries(path: &Path) -> Result<Vec<CatalogEntry>, PlannerError> {
    if !path.exists() {
        return Err(PlannerError::Catalog(format!(
            "data file not found: {:?}",
            path
        )));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| PlannerError::Catalog(format!("failed to read {:?}: {}", path, e)))?;
    ron::from_str(&content)
        .map_err(|e| PlannerError::Catalog(format!("failed to parse {:?}: {}", path, e)))
}

/// Apply a category filter, falling back to the full list when the filter
/// would leave nothing to recommend
fn filter_by_category(entries: &[CatalogEntry], categories: &[Category], source: ActivitySource) -> Vec<CandidateActivity> {
    let all: Vec<CandidateActivity> = entries.iter().map(|e| e.to_candidate(source)).collect();
    if categories.is_empty() {
        return all;
    }
    let matched: Vec<CandidateActivity> = all
        .iter()
        .filter(|c| categories.contains(&c.category))
        .cloned()
        .collect();
    if matched.is_empty() { all } else { matched }
}

/// In-memory view of both catalog files
pub struct ActivityCatalog {
    events: Vec<CatalogEntry>,
    venues: Vec<CatalogEntry>,
}

impl ActivityCatalog {
    /// Load both data files from the config directory
    pub fn load(data_dir: &Path) -> Result<Self, PlannerError> {
        let events = load_entries(&data_dir.join("activity_catalog.ron"))?;
        let venues = load_entries(&data_dir.join("venue_catalog.ron"))?;
        log::info!(
            "[catalog] Loaded {} fallback events and {} venue programs from {:?}",
            events.len(),
            venues.len(),
            data_dir
        );
        Ok(ActivityCatalog { events, venues })
    }

    /// Build directly from entries; lets tests inject fixed data
    pub fn from_entries(events: Vec<CatalogEntry>, venues: Vec<CatalogEntry>) -> Self {
        ActivityCatalog { events, venues }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    /// Deterministic stand-ins for the live events feed
    pub fn fallback_events(&self, categories: &[Category]) -> Vec<CandidateActivity> {
        filter_by_category(&self.events, categories, ActivitySource::Fallback)
    }

    /// Curated venue programs
    pub fn venue_programs(&self, categories: &[Category]) -> Vec<CandidateActivity> {
        filter_by_category(&self.venues, categories, ActivitySource::VenueCatalog)
    }
}

/// Venue capability backed entirely by the curated catalog. Never fails;
/// unknown locations just produce no programs.
pub struct VenueDirectoryProvider {
    catalog: Arc<ActivityCatalog>,
}

impl VenueDirectoryProvider {
    pub fn new(catalog: Arc<ActivityCatalog>) -> Self {
        VenueDirectoryProvider { catalog }
    }
}

#[async_trait]
impl VenueSearch for VenueDirectoryProvider {
    async fn search_venues(&self, location: &str, categories: &[Category]) -> Vec<CandidateActivity> {
        if !ActivityRequest::is_supported_location(location) {
            log::debug!("[venues] no curated programs for '{}'", location);
            return Vec::new();
        }
        let programs = self.catalog.venue_programs(categories);
        log::debug!(
            "[venues] serving {} curated programs for '{}'",
            programs.len(),
            location
        );
        programs
    }
}
