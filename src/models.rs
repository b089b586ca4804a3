//! Domain models for the PlateScan pipeline.
//!
//! Everything here is plain data: profile inputs, detected ingredients,
//! recipe candidates, nutrition facts, and ledger records. Behavior lives in
//! the component modules (`goals`, `normalize`, `matcher`, `meals`,
//! `ledger`); these types only carry values between them and over the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

/// Biological sex, selecting the Harris-Benedict BMR branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Self-reported activity level, mapped to a fixed TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl ActivityLevel {
    // ---
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
        }
    }
}

/// Weight goal direction, mapped to a fixed daily calorie offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalDirection {
    Lose,
    Maintain,
    Gain,
}

impl GoalDirection {
    // ---
    pub fn offset_kcal(self) -> i32 {
        match self {
            GoalDirection::Lose => -500,
            GoalDirection::Maintain => 0,
            GoalDirection::Gain => 300,
        }
    }

    /// Diet hint forwarded to the recipe search for non-maintenance goals.
    pub fn diet_hint(self) -> Option<DietHint> {
        match self {
            GoalDirection::Lose => Some(DietHint::LowCalorie),
            GoalDirection::Gain => Some(DietHint::HighProtein),
            GoalDirection::Maintain => None,
        }
    }

    /// Keyword query used for goal-driven recipe recommendations.
    pub fn search_keywords(self) -> &'static str {
        match self {
            GoalDirection::Lose => "healthy low calorie",
            GoalDirection::Maintain => "balanced healthy meal",
            GoalDirection::Gain => "high protein muscle building",
        }
    }
}

/// Diet constraint understood by the recipe search collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietHint {
    LowCalorie,
    HighProtein,
}

impl DietHint {
    // ---
    pub fn as_query_param(self) -> &'static str {
        match self {
            DietHint::LowCalorie => "low-calorie",
            DietHint::HighProtein => "high-protein",
        }
    }
}

// ---

/// Physiological inputs supplied by the profile edit endpoint.
///
/// Validated by `goals::compute_daily_calories`; never stored directly.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub sex: Sex,
    pub age_years: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
    pub goal: GoalDirection,
}

/// Stored user profile with the derived calorie target.
///
/// `daily_calorie_target` is recomputed on every profile edit and is never
/// accepted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub sex: Sex,
    pub age_years: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
    pub goal: GoalDirection,
    pub daily_calorie_target: i32,
}

// ---

/// Raw label from the image detector, before thresholding and cleanup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawLabel {
    pub name: String,
    pub score: f32,
}

/// Cleaned, deduplicated ingredient ready for recipe search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedIngredient {
    pub name: String,
    pub confidence: f32,
}

// ---

/// Macro nutrition facts. Unknown values are zero, never null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionFacts {
    pub calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl NutritionFacts {
    // ---
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, other: &NutritionFacts) {
        self.calories += other.calories;
        self.protein_g += other.protein_g;
        self.carbs_g += other.carbs_g;
        self.fat_g += other.fat_g;
    }
}

// ---

/// A candidate hit from the recipe search, before nutrition enrichment.
#[derive(Debug, Clone)]
pub struct CandidateHit {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub used_ingredient_count: u32,
    pub missed_ingredient_count: u32,
}

/// Enriched, scored recipe candidate returned by the matcher.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCandidate {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub used_ingredient_count: u32,
    pub missed_ingredient_count: u32,
    pub nutrition: NutritionFacts,
    pub match_percent: u8,
}

/// One structured ingredient line of a full recipe.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub original: String,
}

/// One numbered instruction step of a full recipe.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeStep {
    pub number: u32,
    pub step: String,
}

/// Compact recipe returned by keyword search (recommendations).
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub nutrition: NutritionFacts,
}

/// Full recipe details served by `GET /recipes/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetails {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub summary: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<RecipeStep>,
    pub nutrition: NutritionFacts,
}

// ---

/// Matched food from the free-text nutrition lookup.
///
/// Nutrition is already scaled by the quantity in the query phrase; callers
/// must not multiply again.
#[derive(Debug, Clone)]
pub struct ResolvedFood {
    pub name: String,
    pub serving_qty: f64,
    pub serving_unit: String,
    pub nutrition: NutritionFacts,
}

/// A logged meal, immutable once appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: Uuid,
    pub name: String,
    pub nutrition: NutritionFacts,
    pub servings: f64,
    pub logged_at: DateTime<Utc>,
}
