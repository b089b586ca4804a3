//! Meal logging and daily ledger queries.

use std::sync::Arc;

use axum::{
    extract::Query,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::analysis::{Analyzer, DaySummary, MealLogOutcome};
use crate::error::PipelineError;

// ---

/// Request body for `POST /meals`.
#[derive(Debug, Deserialize)]
struct LogMealRequest {
    name: String,
    /// Defaults to 1 serving when omitted.
    servings: Option<f64>,
}

/// Query parameters for `GET /meals`.
#[derive(Debug, Deserialize)]
struct DayQuery {
    /// `YYYY-MM-DD`; today when omitted.
    date: Option<NaiveDate>,
}

pub fn router() -> Router<Arc<Analyzer>> {
    // ---
    Router::new().route("/meals", post(log_meal).get(day_summary))
}

async fn log_meal(
    State(analyzer): State<Arc<Analyzer>>,
    Json(request): Json<LogMealRequest>,
) -> Result<Json<MealLogOutcome>, PipelineError> {
    // ---
    info!("POST /meals - logging '{}'", request.name);
    let outcome = analyzer
        .log_meal(&request.name, request.servings.unwrap_or(1.0))
        .await?;
    Ok(Json(outcome))
}

async fn day_summary(
    State(analyzer): State<Arc<Analyzer>>,
    Query(params): Query<DayQuery>,
) -> Result<Json<DaySummary>, PipelineError> {
    // ---
    let summary = analyzer.day_summary(params.date).await?;
    Ok(Json(summary))
}
