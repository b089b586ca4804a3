//! Free-text nutrition lookup client.
//!
//! Posts a natural-language quantity phrase to the nutrients endpoint and
//! maps the first matched food to [`ResolvedFood`]. The upstream applies the
//! quantity in the phrase, so the values that come back are already scaled;
//! callers must not multiply again.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::FoodLookup;
use crate::error::PipelineError;
use crate::models::{NutritionFacts, ResolvedFood};

// ---

pub struct NutritionApiClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

impl NutritionApiClient {
    // ---
    pub fn new(http: reqwest::Client, base_url: String, app_id: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            app_id,
            api_key,
        }
    }
}

#[async_trait]
impl FoodLookup for NutritionApiClient {
    // ---
    async fn nutrients(&self, query: &str) -> Result<ResolvedFood, PipelineError> {
        let response = self
            .http
            .post(format!("{}/natural/nutrients", self.base_url))
            .header("x-app-id", &self.app_id)
            .header("x-app-key", &self.api_key)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| PipelineError::upstream("food-lookup", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::upstream(
                "food-lookup",
                format!("HTTP {status}"),
            ));
        }

        let body: NutrientsResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::upstream("food-lookup", e))?;

        let Some(food) = body.foods.into_iter().next() else {
            return Err(PipelineError::FoodNotFound(query.to_string()));
        };

        debug!("food lookup matched '{}' for query '{query}'", food.food_name);
        Ok(food.into_resolved())
    }
}

// --- boundary structs ---

#[derive(Debug, Deserialize)]
struct NutrientsResponse {
    #[serde(default)]
    foods: Vec<FoodEntry>,
}

#[derive(Debug, Deserialize)]
struct FoodEntry {
    #[serde(default)]
    food_name: String,
    #[serde(default)]
    serving_qty: f64,
    #[serde(default)]
    serving_unit: String,
    #[serde(default)]
    nf_calories: f64,
    #[serde(default)]
    nf_protein: f64,
    #[serde(default)]
    nf_total_carbohydrate: f64,
    #[serde(default)]
    nf_total_fat: f64,
}

impl FoodEntry {
    fn into_resolved(self) -> ResolvedFood {
        // ---
        ResolvedFood {
            name: self.food_name,
            serving_qty: self.serving_qty,
            serving_unit: self.serving_unit,
            nutrition: NutritionFacts {
                calories: self.nf_calories.round() as i32,
                protein_g: self.nf_protein.round(),
                carbs_g: self.nf_total_carbohydrate.round(),
                fat_g: self.nf_total_fat.round(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn first_food_entry_maps_with_rounding() {
        // ---
        let body = r#"{
            "foods": [{
                "food_name": "chicken breast",
                "serving_qty": 2,
                "serving_unit": "breast",
                "nf_calories": 547.9,
                "nf_protein": 102.6,
                "nf_total_carbohydrate": 0.0,
                "nf_total_fat": 11.9
            }]
        }"#;

        let parsed: NutrientsResponse = serde_json::from_str(body).unwrap();
        let food = parsed.foods.into_iter().next().unwrap().into_resolved();

        assert_eq!(food.name, "chicken breast");
        assert_eq!(food.serving_qty, 2.0);
        assert_eq!(food.serving_unit, "breast");
        assert_eq!(food.nutrition.calories, 548);
        assert_eq!(food.nutrition.protein_g, 103.0);
        assert_eq!(food.nutrition.fat_g, 12.0);
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        // ---
        let body = r#"{"foods": [{"food_name": "water"}]}"#;
        let parsed: NutrientsResponse = serde_json::from_str(body).unwrap();
        let food = parsed.foods.into_iter().next().unwrap().into_resolved();
        assert_eq!(food.nutrition, NutritionFacts::zero());
    }

    #[test]
    fn empty_foods_array_parses_as_empty() {
        // ---
        let parsed: NutrientsResponse = serde_json::from_str(r#"{"foods": []}"#).unwrap();
        assert!(parsed.foods.is_empty());
        let parsed: NutrientsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.foods.is_empty());
    }
}
