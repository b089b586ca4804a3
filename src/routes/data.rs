//! Clear-all endpoint: wipes every ledger partition and the profile.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::delete, Router};
use tracing::warn;

use crate::analysis::Analyzer;
use crate::error::PipelineError;

// ---

pub fn router() -> Router<Arc<Analyzer>> {
    // ---
    Router::new().route("/data", delete(clear_all))
}

async fn clear_all(State(analyzer): State<Arc<Analyzer>>) -> Result<StatusCode, PipelineError> {
    // ---
    warn!("DELETE /data - wiping all stored data");
    analyzer.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
