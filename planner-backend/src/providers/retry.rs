//! Exponential backoff state for live provider endpoints
//!
//! Tracks consecutive failures per endpoint key. While an endpoint is
//! backed off, callers skip the live request and serve catalog fallback
//! immediately instead of waiting on a struggling upstream.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Minimum backoff delay in seconds
const MIN_BACKOFF_SECS: u64 = 5;
/// Maximum backoff delay in seconds
const MAX_BACKOFF_SECS: u64 = 60;
/// Quiet period after which error history is forgotten
const RESET_AFTER_SECS: u64 = 120;

#[derive(Debug, Clone)]
struct BackoffState {
    current_delay: u64,
    last_error_at: Instant,
    error_count: u32,
}

impl Default for BackoffState {
    fn default() -> Self {
        BackoffState {
            current_delay: MIN_BACKOFF_SECS,
            last_error_at: Instant::now(),
            error_count: 0,
        }
    }
}

/// Per-endpoint backoff table. One instance is constructed per provider
/// and injected with it, so tests get isolated state.
pub struct ProviderBackoff {
    states: RwLock<HashMap<String, BackoffState>>,
}

impl ProviderBackoff {
    pub fn new() -> Self {
        ProviderBackoff {
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Record a successful request, clearing any backoff for the key
    pub fn record_success(&self, key: &str) {
        if let Ok(mut states) = self.states.write() {
            if states.remove(key).is_some() {
                log::debug!("[backoff] success for '{}', window cleared", key);
            }
        }
    }

    /// Record a failed request; returns the delay in seconds before the
    /// next live attempt is allowed
    pub fn record_error(&self, key: &str) -> u64 {
        let mut states = match self.states.write() {
            Ok(s) => s,
            Err(_) => return MIN_BACKOFF_SECS,
        };

        let state = states.entry(key.to_string()).or_default();
        let now = Instant::now();

        let elapsed = now.duration_since(state.last_error_at);
        if elapsed > Duration::from_secs(RESET_AFTER_SECS) {
            state.current_delay = MIN_BACKOFF_SECS;
            state.error_count = 1;
        } else {
            state.error_count += 1;
            if state.error_count > 1 {
                state.current_delay = (state.current_delay * 2).min(MAX_BACKOFF_SECS);
            }
        }

        state.last_error_at = now;
        let delay = state.current_delay;

        log::warn!(
            "[backoff] error #{} for '{}', next live attempt in {}s",
            state.error_count,
            key,
            delay
        );

        delay
    }

    /// Whether the key is still inside its backoff window
    pub fn is_backed_off(&self, key: &str) -> bool {
        let states = match self.states.read() {
            Ok(s) => s,
            Err(_) => return false,
        };
        match states.get(key) {
            Some(state) if state.error_count > 0 => {
                state.last_error_at.elapsed() < Duration::from_secs(state.current_delay)
            }
            _ => false,
        }
    }

    /// Current delay for a key without recording anything
    pub fn current_delay(&self, key: &str) -> Option<u64> {
        self.states
            .read()
            .ok()
            .and_then(|states| states.get(key).map(|s| s.current_delay))
    }

    /// Whether an HTTP status is worth a later retry
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
    }
}

impl Default for ProviderBackoff {
    fn default() -> Self {
        Self::new()
    }
}
