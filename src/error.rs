//! Error taxonomy for the PlateScan pipeline.
//!
//! Every fallible pipeline operation returns [`PipelineError`]. Enrichment
//! failures inside the recipe matcher are deliberately *not* represented
//! here: they are absorbed per candidate (zero-nutrition substitution) and
//! only logged, never surfaced to callers. The `IntoResponse` impl maps each
//! variant to an HTTP status so route handlers can simply `?` out.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use thiserror::Error;

// ---

/// Errors that can propagate out of a pipeline operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Profile inputs failed validation (or no profile has been set up yet).
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// No usable ingredients survived detection + normalization.
    #[error("no ingredients detected in image")]
    DetectionEmpty,

    /// An upstream collaborator call failed outright.
    #[error("{provider} upstream unavailable: {reason}")]
    UpstreamUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// Candidate search returned nothing to rank.
    #[error("no recipe candidates found")]
    NoCandidates,

    /// Free-text nutrition lookup had no match for the query.
    #[error("food not found: {0}")]
    FoodNotFound(String),

    /// Key-value persistence failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl PipelineError {
    // ---
    pub fn upstream(provider: &'static str, reason: impl ToString) -> Self {
        PipelineError::UpstreamUnavailable {
            provider,
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        PipelineError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Storage(format!("corrupt stored value: {e}"))
    }
}

// ---

/// JSON error body returned to API clients.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            PipelineError::InvalidProfile(_) | PipelineError::DetectionEmpty => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::NoCandidates | PipelineError::FoodNotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            PipelineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
