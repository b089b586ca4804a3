//! Recipe details and goal-driven recommendation endpoints.

use std::sync::Arc;

use axum::{
    extract::Path, extract::State, routing::get, Json, Router,
};
use tracing::info;

use crate::analysis::Analyzer;
use crate::error::PipelineError;
use crate::models::{RecipeDetails, RecipeSummary};

// ---

pub fn router() -> Router<Arc<Analyzer>> {
    // ---
    Router::new()
        .route("/recipes/{id}", get(details))
        .route("/recommendations", get(recommendations))
}

async fn details(
    State(analyzer): State<Arc<Analyzer>>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetails>, PipelineError> {
    // ---
    info!("GET /recipes/{id}");
    Ok(Json(analyzer.recipe_details(id).await?))
}

async fn recommendations(
    State(analyzer): State<Arc<Analyzer>>,
) -> Result<Json<Vec<RecipeSummary>>, PipelineError> {
    // ---
    Ok(Json(analyzer.recommendations().await?))
}
