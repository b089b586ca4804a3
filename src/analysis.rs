//! Top-level use-case orchestration.
//!
//! [`Analyzer`] wires the pipeline together: detector → normalizer → matcher
//! for image scans, resolver → ledger for meal logging, plus profile edits
//! and the goal-driven recommendation/details passthroughs. Route handlers
//! call into here and nothing else; every dependency arrives at construction
//! so tests can swap in fakes.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::clients::{FoodLookup, IngredientDetector, RecipeSearch};
use crate::error::PipelineError;
use crate::goals;
use crate::ledger::NutritionLedger;
use crate::matcher::RecipeMatcher;
use crate::meals::MealResolver;
use crate::models::{
    DetectedIngredient, MealRecord, NutritionFacts, Profile, ProfileInput, RecipeCandidate,
    RecipeDetails, RecipeSummary,
};
use crate::normalize;
use crate::storage::{KvStore, ProfileRepo};

// ---

/// Extra headroom over the per-meal window for recommendation search.
const RECOMMENDATION_CALORIE_HEADROOM: i32 = 300;

/// Result of an image scan: what was seen and what to cook with it.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub ingredients: Vec<DetectedIngredient>,
    pub recipes: Vec<RecipeCandidate>,
    pub message: String,
}

/// Result of logging one meal.
#[derive(Debug, Serialize)]
pub struct MealLogOutcome {
    pub record: MealRecord,
    pub daily_totals: NutritionFacts,
}

/// A day's ledger view.
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub meals: Vec<MealRecord>,
    pub totals: NutritionFacts,
}

// ---

pub struct Analyzer {
    detector: Arc<dyn IngredientDetector>,
    search: Arc<dyn RecipeSearch>,
    matcher: RecipeMatcher,
    resolver: MealResolver,
    ledger: NutritionLedger,
    profiles: ProfileRepo,
}

impl Analyzer {
    // ---
    pub fn new(
        detector: Arc<dyn IngredientDetector>,
        search: Arc<dyn RecipeSearch>,
        lookup: Arc<dyn FoodLookup>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            detector,
            matcher: RecipeMatcher::new(Arc::clone(&search)),
            search,
            resolver: MealResolver::new(lookup),
            ledger: NutritionLedger::new(Arc::clone(&store)),
            profiles: ProfileRepo::new(store),
        }
    }

    /// Detect ingredients in the image and rank recipes for them under the
    /// stored profile's calorie target.
    pub async fn analyze_image(&self, image: &[u8]) -> Result<AnalysisReport, PipelineError> {
        // ---
        let profile = self.require_profile().await?;

        let raw_labels = self.detector.detect(image).await?;
        let ingredients = normalize::normalize(&raw_labels)?;
        info!("detected {} ingredients", ingredients.len());

        let recipes = self
            .matcher
            .match_recipes(
                &ingredients,
                profile.daily_calorie_target,
                profile.goal.diet_hint(),
            )
            .await?;

        let message = format!(
            "Found {} ingredients and {} recipes",
            ingredients.len(),
            recipes.len()
        );
        Ok(AnalysisReport {
            ingredients,
            recipes,
            message,
        })
    }

    /// Resolve and append one meal to today's ledger partition.
    pub async fn log_meal(
        &self,
        meal_name: &str,
        servings: f64,
    ) -> Result<MealLogOutcome, PipelineError> {
        // ---
        let record = self.resolver.resolve(meal_name, servings).await?;
        let today = local_date();

        self.ledger.append(today, record.clone()).await?;
        let daily_totals = self.ledger.daily_totals(today).await?;

        info!(
            "logged '{}' ({} kcal), {} kcal so far today",
            record.name, record.nutrition.calories, daily_totals.calories
        );
        Ok(MealLogOutcome {
            record,
            daily_totals,
        })
    }

    /// Records and totals for the given date (today when omitted).
    pub async fn day_summary(&self, date: Option<NaiveDate>) -> Result<DaySummary, PipelineError> {
        // ---
        let date = date.unwrap_or_else(local_date);
        Ok(DaySummary {
            date,
            meals: self.ledger.meals_for(date).await?,
            totals: self.ledger.daily_totals(date).await?,
        })
    }

    /// Goal-driven keyword recommendations capped at the per-meal window.
    pub async fn recommendations(&self) -> Result<Vec<RecipeSummary>, PipelineError> {
        // ---
        let profile = self.require_profile().await?;
        let per_meal = (f64::from(profile.daily_calorie_target) / 3.0).round() as i32;

        self.search
            .search(
                profile.goal.search_keywords(),
                Some(per_meal + RECOMMENDATION_CALORIE_HEADROOM),
            )
            .await
    }

    /// Full recipe information passthrough.
    pub async fn recipe_details(&self, recipe_id: i64) -> Result<RecipeDetails, PipelineError> {
        self.search.details(recipe_id).await
    }

    /// Validate profile inputs, derive the calorie target, and store.
    pub async fn update_profile(&self, input: ProfileInput) -> Result<Profile, PipelineError> {
        // ---
        let profile = goals::build_profile(input)?;
        self.profiles.save(&profile).await?;
        info!(
            "profile updated, daily target {} kcal",
            profile.daily_calorie_target
        );
        Ok(profile)
    }

    pub async fn profile(&self) -> Result<Profile, PipelineError> {
        self.require_profile().await
    }

    /// Wipe every ledger partition and the profile. Irreversible.
    pub async fn clear_all(&self) -> Result<(), PipelineError> {
        // ---
        info!("clearing all stored data");
        self.ledger.clear_all().await
    }

    async fn require_profile(&self) -> Result<Profile, PipelineError> {
        // ---
        self.profiles
            .load()
            .await?
            .ok_or_else(|| PipelineError::InvalidProfile("no profile configured".to_string()))
    }
}

fn local_date() -> NaiveDate {
    Local::now().date_naive()
}
