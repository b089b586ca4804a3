use std::sync::Arc;

use axum::Router;

use crate::analysis::Analyzer;

mod analyze;
mod data;
mod health;
mod meals;
mod profile;
mod recipes;

// ---

pub fn router(analyzer: Arc<Analyzer>) -> Router {
    // ---
    Router::new()
        .merge(analyze::router())
        .merge(meals::router())
        .merge(profile::router())
        .merge(recipes::router())
        .merge(data::router())
        .merge(health::router())
        .with_state(analyzer)
}
