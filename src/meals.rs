//! Free-text meal resolution for ledger logging.
//!
//! Turns "chicken breast" + 2 servings into a structured [`MealRecord`] via
//! one free-text nutrition lookup. The serving count is folded into the
//! query phrase ("2 chicken breast") and the upstream scales the macros for
//! us, so the returned values are used as-is and scaling happens exactly once.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::clients::FoodLookup;
use crate::error::PipelineError;
use crate::models::MealRecord;

// ---

pub struct MealResolver {
    lookup: Arc<dyn FoodLookup>,
}

impl MealResolver {
    // ---
    pub fn new(lookup: Arc<dyn FoodLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve a meal name and serving count to a loggable record.
    ///
    /// Non-finite or non-positive serving counts default to 1 rather than
    /// propagating. Fails with [`PipelineError::FoodNotFound`] when the
    /// upstream has no match.
    pub async fn resolve(&self, meal_name: &str, servings: f64) -> Result<MealRecord, PipelineError> {
        // ---
        let servings = sanitize_servings(servings);
        let query = format!("{servings} {meal_name}");

        let food = self.lookup.nutrients(&query).await?;

        Ok(MealRecord {
            id: Uuid::new_v4(),
            name: food.name,
            nutrition: food.nutrition,
            servings,
            logged_at: Utc::now(),
        })
    }
}

fn sanitize_servings(servings: f64) -> f64 {
    // ---
    if servings.is_finite() && servings > 0.0 {
        servings
    } else {
        1.0
    }
}
