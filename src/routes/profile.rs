//! Profile read and full-edit endpoints.
//!
//! The daily calorie target is always derived server-side from the submitted
//! physiological inputs; clients can read it back but never set it.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use crate::analysis::Analyzer;
use crate::error::PipelineError;
use crate::models::{Profile, ProfileInput};

// ---

pub fn router() -> Router<Arc<Analyzer>> {
    // ---
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

async fn get_profile(
    State(analyzer): State<Arc<Analyzer>>,
) -> Result<Json<Profile>, PipelineError> {
    // ---
    Ok(Json(analyzer.profile().await?))
}

async fn put_profile(
    State(analyzer): State<Arc<Analyzer>>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Profile>, PipelineError> {
    // ---
    info!("PUT /profile - recomputing calorie target");
    Ok(Json(analyzer.update_profile(input).await?))
}
