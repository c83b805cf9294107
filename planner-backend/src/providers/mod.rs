pub mod catalog;
pub mod predicthq;
pub mod retry;

pub use catalog::{ActivityCatalog, CatalogEntry, VenueDirectoryProvider};
pub use predicthq::LiveEventsProvider;
pub use retry::ProviderBackoff;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{CandidateActivity, Category, DateRange};

/// Event discovery capability. Implementations absorb their own failures
/// and fall back to deterministic data instead of returning errors.
#[async_trait]
pub trait EventSearch: Send + Sync {
    async fn search_events(
        &self,
        location: &str,
        date_range: &DateRange,
        categories: &[Category],
    ) -> Vec<CandidateActivity>;
}

/// Venue directory capability
#[async_trait]
pub trait VenueSearch: Send + Sync {
    async fn search_venues(&self, location: &str, categories: &[Category])
        -> Vec<CandidateActivity>;
}

/// The two external capabilities every agent task runs against. Cloning
/// is cheap, both sides are shared.
#[derive(Clone)]
pub struct ProviderSet {
    pub events: Arc<dyn EventSearch>,
    pub venues: Arc<dyn VenueSearch>,
}

impl ProviderSet {
    pub fn new(events: Arc<dyn EventSearch>, venues: Arc<dyn VenueSearch>) -> Self {
        ProviderSet { events, venues }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    pub struct NoEvents;

    #[async_trait]
    impl EventSearch for NoEvents {
        async fn search_events(
            &self,
            _location: &str,
            _date_range: &DateRange,
            _categories: &[Category],
        ) -> Vec<CandidateActivity> {
            Vec::new()
        }
    }

    pub struct NoVenues;

    #[async_trait]
    impl VenueSearch for NoVenues {
        async fn search_venues(
            &self,
            _location: &str,
            _categories: &[Category],
        ) -> Vec<CandidateActivity> {
            Vec::new()
        }
    }

    /// Provider set that finds nothing, for tasks that never touch it
    pub fn empty_providers() -> ProviderSet {
        ProviderSet::new(Arc::new(NoEvents), Arc::new(NoVenues))
    }
}
