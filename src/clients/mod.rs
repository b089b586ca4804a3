//! HTTP collaborator clients (EMBP gateway).
//!
//! Each upstream service lives in its own sibling module and is reached
//! through a trait so the pipeline components can be constructed with fakes
//! in tests. The traits are the narrow contracts the core depends on; the
//! concrete clients own the URLs, credentials, and boundary parsing.

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::models::{
    CandidateHit, DietHint, NutritionFacts, RawLabel, RecipeDetails, RecipeSummary, ResolvedFood,
};

mod nutrition;
mod recipes;
mod vision;

pub use nutrition::NutritionApiClient;
pub use recipes::RecipeApiClient;
pub use vision::VisionClient;

// ---

/// Image ingredient detector: raw image bytes in, scored labels out.
///
/// Thresholding and cleanup are left to the normalizer; implementations
/// return everything the upstream reported.
#[async_trait]
pub trait IngredientDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Vec<RawLabel>, PipelineError>;
}

/// Recipe candidate search plus per-candidate nutrition and details.
#[async_trait]
pub trait RecipeSearch: Send + Sync {
    /// Up to `max_results` candidates ranked by the service's own
    /// "maximize used ingredients" ordering.
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        diet: Option<DietHint>,
        max_results: u32,
    ) -> Result<Vec<CandidateHit>, PipelineError>;

    /// Nutrition facts for one candidate. Failures here are isolated by the
    /// matcher, never fatal to a batch.
    async fn nutrition(&self, recipe_id: i64) -> Result<NutritionFacts, PipelineError>;

    /// Full recipe information including ingredients and instructions.
    async fn details(&self, recipe_id: i64) -> Result<RecipeDetails, PipelineError>;

    /// Keyword search with an optional per-serving calorie cap.
    async fn search(
        &self,
        query: &str,
        max_calories: Option<i32>,
    ) -> Result<Vec<RecipeSummary>, PipelineError>;
}

/// Free-text nutrition lookup for meal logging.
#[async_trait]
pub trait FoodLookup: Send + Sync {
    /// Resolve a natural-language quantity phrase ("2 chicken breast") to a
    /// matched food with quantity-scaled macros.
    async fn nutrients(&self, query: &str) -> Result<ResolvedFood, PipelineError>;
}
