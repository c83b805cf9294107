//! Error taxonomy for the planning pipeline
//!
//! Provider and task failures are absorbed into partial-result narratives;
//! only validation failures propagate to the caller as a rejection.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Network/auth failure talking to an external data provider. Recovered
    /// locally by substituting catalog fallback data.
    #[error("provider '{provider}' unavailable: {reason}")]
    ProviderUnavailable { provider: &'static str, reason: String },

    /// An agent task exceeded its time budget. Recorded in the task result,
    /// never fatal to the request.
    #[error("task '{task}' exceeded its {limit_secs}s task budget")]
    TaskTimeout { task: String, limit_secs: u64 },

    /// Malformed request, rejected at the boundary before dispatch.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The convergence step failed to produce a plan. Guarded against in
    /// the pipeline, so reaching the caller means a bug.
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// Static catalog data could not be read or parsed at startup.
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl PlannerError {
    pub fn provider(provider: &'static str, reason: impl std::fmt::Display) -> Self {
        PlannerError::ProviderUnavailable {
            provider,
            reason: reason.to_string(),
        }
    }

    /// Whether retrying the same operation later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlannerError::ProviderUnavailable { .. } | PlannerError::TaskTimeout { .. }
        )
    }
}

impl ResponseError for PlannerError {
    fn status_code(&self) -> StatusCode {
        match self {
            PlannerError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
