//! PredictHQ events feed client
//!
//! Queries the PredictHQ API for upcoming events around downtown Cleveland.
//! Every failure path degrades to the catalog's fallback events, so the
//! event scout always has data to hand the synthesizer. Repeated feed
//! failures open a backoff window during which the feed is not contacted
//! at all.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{header, Client};
use serde::Deserialize;

use crate::error::PlannerError;
use crate::models::{
    parse_age_range, ActivitySource, CandidateActivity, Category, DateRange, PriceTier,
    ScheduleWindow,
};
use crate::providers::catalog::ActivityCatalog;
use crate::providers::retry::ProviderBackoff;
use crate::providers::EventSearch;

const EVENTS_ENDPOINT: &str = "https://api.predicthq.com/v1/events/";
const PROVIDER: &str = "predicthq";

/// Downtown Cleveland, center of every radius search
const CLEVELAND_LAT: f64 = 41.4993;
const CLEVELAND_LNG: f64 = -81.6944;

const FEED_LIMIT: u32 = 10;
/// Minimum PredictHQ rank; filters out tiny unranked listings
const MIN_EVENT_RANK: u32 = 20;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    results: Vec<FeedEvent>,
}

#[derive(Debug, Deserialize)]
struct FeedEvent {
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    entities: Vec<FeedEntity>,
}

#[derive(Debug, Deserialize)]
struct FeedEntity {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    entity_type: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
}

/// Map a feed category back to a planner category, preferring title
/// keywords when they are specific enough
fn resolve_category(feed_category: &str, title: &str) -> Category {
    match Category::classify(title) {
        Category::General => match feed_category {
            "performing-arts" | "concerts" | "festivals" => Category::Arts,
            "sports" => Category::Sports,
            "conferences" | "expos" | "education" => Category::Educational,
            "community" => Category::Social,
            _ => Category::General,
        },
        specific => specific,
    }
}

/// The feed does not expose ticket prices, so estimate from category
fn estimate_price(feed_category: &str) -> &'static str {
    match feed_category {
        "concerts" | "performing-arts" => "$15-50",
        "conferences" | "expos" => "$10-30",
        "sports" => "$20-100",
        _ => "Free",
    }
}

/// Union of feed categories to query, in planner-category order
fn collect_feed_categories(categories: &[Category]) -> String {
    let source: &[Category] = if categories.is_empty() {
        &[Category::General]
    } else {
        categories
    };
    let mut seen: Vec<&'static str> = Vec::new();
    for category in source {
        for feed in category.feed_categories() {
            if !seen.contains(feed) {
                seen.push(feed);
            }
        }
    }
    seen.join(",")
}

/// Split an RFC 3339 start timestamp into the date and time labels the
/// rest of the pipeline works with
fn split_start(start: Option<&str>) -> (String, String) {
    match start.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
        Some(dt) => (
            dt.format("%Y-%m-%d").to_string(),
            dt.format("%I:%M %p").to_string(),
        ),
        None => (String::new(), String::new()),
    }
}

fn feed_event_to_candidate(event: &FeedEvent) -> CandidateActivity {
    let (date, time) = split_start(event.start.as_deref());
    let venue_entity = event
        .entities
        .iter()
        .find(|e| e.entity_type.as_deref() == Some("venue"));
    let venue = venue_entity
        .and_then(|e| e.name.clone())
        .unwrap_or_else(|| "Cleveland area venue".to_string());
    let address = venue_entity
        .and_then(|e| e.formatted_address.clone())
        .unwrap_or_else(|| "Cleveland, OH".to_string());
    let price_label = estimate_price(&event.category);
    let (min_age, max_age) = parse_age_range("All ages");
    CandidateActivity {
        name: event.title.clone(),
        category: resolve_category(&event.category, &event.title),
        min_age,
        max_age,
        price_tier: PriceTier::parse(price_label),
        price_label: price_label.to_string(),
        venue,
        address,
        schedule_window: ScheduleWindow::new(date, time),
        accessibility_flags: Vec::new(),
        link: None,
        source: ActivitySource::EventsFeed,
    }
}

/// Event capability backed by the live feed with catalog fallback
pub struct LiveEventsProvider {
    client: Client,
    api_key: Option<String>,
    radius_miles: u32,
    backoff: ProviderBackoff,
    catalog: Arc<ActivityCatalog>,
}

impl LiveEventsProvider {
    pub fn new(api_key: Option<String>, radius_miles: u32, catalog: Arc<ActivityCatalog>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let api_key = api_key.and_then(|key| {
            match header::HeaderValue::from_str(&format!("Bearer {}", key)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                    Some(key)
                }
                Err(e) => {
                    log::warn!("[events] Dropping malformed feed API key: {}", e);
                    None
                }
            }
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("planner-backend/0.2 (Event Scout)")
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        LiveEventsProvider {
            client,
            api_key,
            radius_miles,
            backoff: ProviderBackoff::new(),
            catalog,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_live(
        &self,
        date_range: &DateRange,
        categories: &[Category],
    ) -> Result<Vec<CandidateActivity>, PlannerError> {
        let (start, end) = date_range.resolve();
        let params = [
            ("category", collect_feed_categories(categories)),
            ("active.gte", start.format("%Y-%m-%d").to_string()),
            ("active.lte", end.format("%Y-%m-%d").to_string()),
            ("active.tz", "America/New_York".to_string()),
            (
                "within",
                format!("{}mi@{},{}", self.radius_miles, CLEVELAND_LAT, CLEVELAND_LNG),
            ),
            ("rank.gte", MIN_EVENT_RANK.to_string()),
            ("brand_unsafe.exclude", "true".to_string()),
            ("limit", FEED_LIMIT.to_string()),
        ];

        let response = match self.client.get(EVENTS_ENDPOINT).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() || e.is_connect() {
                    let delay = self.backoff.record_error(PROVIDER);
                    log::warn!("[events] Transport error, backing off {}s", delay);
                }
                return Err(PlannerError::provider(PROVIDER, format!("request failed: {}", e)));
            }
        };

        let status = response.status();
        if !status.is_success() {
            if ProviderBackoff::is_retryable_status(status.as_u16()) {
                let delay = self.backoff.record_error(PROVIDER);
                log::warn!("[events] Feed returned {}, backing off {}s", status, delay);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::provider(
                PROVIDER,
                format!("feed returned {}: {}", status, body),
            ));
        }

        self.backoff.record_success(PROVIDER);

        let body = response
            .text()
            .await
            .map_err(|e| PlannerError::provider(PROVIDER, format!("failed to read feed response: {}", e)))?;
        let feed: FeedResponse = serde_json::from_str(&body)
            .map_err(|e| PlannerError::provider(PROVIDER, format!("failed to parse feed response: {}", e)))?;

        log::debug!("[events] Feed returned {} raw events", feed.results.len());
        Ok(feed.results.iter().map(feed_event_to_candidate).collect())
    }
}

#[async_trait]
impl EventSearch for LiveEventsProvider {
    async fn search_events(
        &self,
        location: &str,
        date_range: &DateRange,
        categories: &[Category],
    ) -> Vec<CandidateActivity> {
        if self.api_key.is_none() {
            log::debug!("[events] No feed credentials, serving fallback events");
            return self.catalog.fallback_events(categories);
        }
        if self.backoff.is_backed_off(PROVIDER) {
            log::warn!(
                "[events] Feed in backoff window ({}s), serving fallback events",
                self.backoff.current_delay(PROVIDER).unwrap_or_default()
            );
            return self.catalog.fallback_events(categories);
        }

        match self.fetch_live(date_range, categories).await {
            Ok(found) if !found.is_empty() => {
                log::info!("[events] Feed returned {} events near '{}'", found.len(), location);
                found
            }
            Ok(_) => {
                log::info!("[events] Feed returned no events, serving fallback events");
                self.catalog.fallback_events(categories)
            }
            Err(e) => {
                log::warn!("[events] {}; serving fallback events", e);
                self.catalog.fallback_events(categories)
            }
        }
    }
}
