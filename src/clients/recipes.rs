//! Recipe search and nutrition client.
//!
//! Four upstream operations: find-by-ingredients (candidate search),
//! per-recipe nutrition widget, full recipe information, and keyword search.
//! The nutrition widget reports macros as strings ("26g"), so numeric
//! parsing lives here behind explicit boundary structs; everything missing
//! defaults to zero rather than failing the parse.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::RecipeSearch;
use crate::error::PipelineError;
use crate::models::{
    CandidateHit, DietHint, NutritionFacts, RecipeDetails, RecipeIngredient, RecipeStep,
    RecipeSummary,
};

// ---

pub struct RecipeApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RecipeApiClient {
    // ---
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        provider: &'static str,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, PipelineError> {
        // ---
        let response = self
            .http
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| PipelineError::upstream(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::upstream(provider, format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::upstream(provider, e))
    }
}

#[async_trait]
impl RecipeSearch for RecipeApiClient {
    // ---
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        diet: Option<DietHint>,
        max_results: u32,
    ) -> Result<Vec<CandidateHit>, PipelineError> {
        let mut query = vec![
            ("ingredients", ingredients.join(",")),
            ("number", max_results.to_string()),
            // Ranking mode 2: maximize used ingredients.
            ("ranking", "2".to_string()),
            ("ignorePantry", "false".to_string()),
        ];
        if let Some(diet) = diet {
            query.push(("diet", diet.as_query_param().to_string()));
        }

        let hits: Vec<FindByIngredientsHit> = self
            .get_json(
                "recipe-search",
                format!("{}/recipes/findByIngredients", self.base_url),
                &query,
            )
            .await?;

        debug!("recipe search returned {} candidates", hits.len());
        Ok(hits.into_iter().map(CandidateHit::from).collect())
    }

    async fn nutrition(&self, recipe_id: i64) -> Result<NutritionFacts, PipelineError> {
        let widget: NutritionWidget = self
            .get_json(
                "recipe-nutrition",
                format!("{}/recipes/{recipe_id}/nutritionWidget.json", self.base_url),
                &[],
            )
            .await?;

        Ok(widget.into_facts())
    }

    async fn details(&self, recipe_id: i64) -> Result<RecipeDetails, PipelineError> {
        let info: InformationResponse = self
            .get_json(
                "recipe-search",
                format!("{}/recipes/{recipe_id}/information", self.base_url),
                &[("includeNutrition", "true".to_string())],
            )
            .await?;

        Ok(info.into_details())
    }

    async fn search(
        &self,
        query: &str,
        max_calories: Option<i32>,
    ) -> Result<Vec<RecipeSummary>, PipelineError> {
        let mut params = vec![
            ("query", query.to_string()),
            ("number", "10".to_string()),
            ("addRecipeInformation", "true".to_string()),
            ("fillIngredients", "true".to_string()),
        ];
        if let Some(cap) = max_calories {
            params.push(("maxCalories", cap.to_string()));
        }

        let body: ComplexSearchResponse = self
            .get_json(
                "recipe-search",
                format!("{}/recipes/complexSearch", self.base_url),
                &params,
            )
            .await?;

        Ok(body
            .results
            .into_iter()
            .map(InformationResponse::into_summary)
            .collect())
    }
}

// --- boundary structs ---

#[derive(Debug, Deserialize)]
struct FindByIngredientsHit {
    id: i64,
    title: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, rename = "usedIngredientCount")]
    used_ingredient_count: u32,
    #[serde(default, rename = "missedIngredientCount")]
    missed_ingredient_count: u32,
}

impl From<FindByIngredientsHit> for CandidateHit {
    fn from(hit: FindByIngredientsHit) -> Self {
        CandidateHit {
            id: hit.id,
            title: hit.title,
            image: hit.image,
            used_ingredient_count: hit.used_ingredient_count,
            missed_ingredient_count: hit.missed_ingredient_count,
        }
    }
}

/// Nutrition widget body: every value arrives as a display string
/// ("584", "26g"); absent fields become empty strings and parse to zero.
#[derive(Debug, Deserialize)]
struct NutritionWidget {
    #[serde(default)]
    calories: String,
    #[serde(default)]
    protein: String,
    #[serde(default)]
    carbs: String,
    #[serde(default)]
    fat: String,
}

impl NutritionWidget {
    fn into_facts(self) -> NutritionFacts {
        NutritionFacts {
            calories: leading_number(&self.calories).round() as i32,
            protein_g: leading_number(&self.protein),
            carbs_g: leading_number(&self.carbs),
            fat_g: leading_number(&self.fat),
        }
    }
}

/// Numeric prefix of a display string ("26g" -> 26.0); 0 when absent.
fn leading_number(s: &str) -> f64 {
    // ---
    let trimmed = s.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct InformationResponse {
    id: i64,
    title: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, rename = "readyInMinutes")]
    ready_in_minutes: Option<u32>,
    #[serde(default)]
    servings: Option<u32>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, rename = "extendedIngredients")]
    extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default, rename = "analyzedInstructions")]
    analyzed_instructions: Vec<InstructionBlock>,
    #[serde(default)]
    nutrition: Option<NutritionBlock>,
}

impl InformationResponse {
    // ---
    fn facts(&self) -> NutritionFacts {
        self.nutrition
            .as_ref()
            .map(NutritionBlock::to_facts)
            .unwrap_or_default()
    }

    fn into_details(self) -> RecipeDetails {
        let nutrition = self.facts();
        RecipeDetails {
            id: self.id,
            title: self.title,
            image: self.image,
            ready_in_minutes: self.ready_in_minutes,
            servings: self.servings,
            summary: self.summary.as_deref().map(strip_tags),
            ingredients: self
                .extended_ingredients
                .into_iter()
                .map(|i| RecipeIngredient {
                    name: i.name,
                    amount: i.amount,
                    unit: i.unit,
                    original: i.original,
                })
                .collect(),
            instructions: self
                .analyzed_instructions
                .into_iter()
                .next()
                .map(|block| {
                    block
                        .steps
                        .into_iter()
                        .map(|s| RecipeStep {
                            number: s.number,
                            step: s.step,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            nutrition,
        }
    }

    fn into_summary(self) -> RecipeSummary {
        let nutrition = self.facts();
        RecipeSummary {
            id: self.id,
            title: self.title,
            image: self.image,
            ready_in_minutes: self.ready_in_minutes,
            servings: self.servings,
            nutrition,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtendedIngredient {
    #[serde(default)]
    name: String,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    original: String,
}

#[derive(Debug, Deserialize)]
struct InstructionBlock {
    #[serde(default)]
    steps: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
struct StepEntry {
    number: u32,
    step: String,
}

#[derive(Debug, Deserialize)]
struct NutritionBlock {
    #[serde(default)]
    nutrients: Vec<Nutrient>,
}

impl NutritionBlock {
    // ---
    fn to_facts(&self) -> NutritionFacts {
        NutritionFacts {
            calories: self.amount_of("Calories").round() as i32,
            protein_g: self.amount_of("Protein"),
            carbs_g: self.amount_of("Carbohydrates"),
            fat_g: self.amount_of("Fat"),
        }
    }

    fn amount_of(&self, name: &str) -> f64 {
        self.nutrients
            .iter()
            .find(|n| n.name == name)
            .map_or(0.0, |n| n.amount)
    }
}

#[derive(Debug, Deserialize)]
struct Nutrient {
    name: String,
    #[serde(default)]
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct ComplexSearchResponse {
    #[serde(default)]
    results: Vec<InformationResponse>,
}

/// Remove HTML tags from a summary string.
fn strip_tags(s: &str) -> String {
    // ---
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn leading_number_handles_units_and_garbage() {
        // ---
        assert_eq!(leading_number("26g"), 26.0);
        assert_eq!(leading_number("584"), 584.0);
        assert_eq!(leading_number("12.5g"), 12.5);
        assert_eq!(leading_number(""), 0.0);
        assert_eq!(leading_number("n/a"), 0.0);
    }

    #[test]
    fn nutrition_widget_parses_display_strings() {
        // ---
        let body = r#"{"calories": "584", "protein": "26g", "carbs": "51g", "fat": "31g"}"#;
        let widget: NutritionWidget = serde_json::from_str(body).unwrap();
        let facts = widget.into_facts();

        assert_eq!(facts.calories, 584);
        assert_eq!(facts.protein_g, 26.0);
        assert_eq!(facts.carbs_g, 51.0);
        assert_eq!(facts.fat_g, 31.0);
    }

    #[test]
    fn nutrition_widget_missing_fields_default_to_zero() {
        // ---
        let widget: NutritionWidget = serde_json::from_str("{}").unwrap();
        assert_eq!(widget.into_facts(), NutritionFacts::zero());
    }

    #[test]
    fn find_by_ingredients_hit_maps_counts() {
        // ---
        let body = r#"{
            "id": 641803,
            "title": "Easy Stuffed Peppers",
            "image": "https://img.example/641803.jpg",
            "usedIngredientCount": 3,
            "missedIngredientCount": 1
        }"#;

        let hit: CandidateHit = serde_json::from_str::<FindByIngredientsHit>(body)
            .unwrap()
            .into();
        assert_eq!(hit.id, 641803);
        assert_eq!(hit.used_ingredient_count, 3);
        assert_eq!(hit.missed_ingredient_count, 1);
    }

    #[test]
    fn information_response_builds_details() {
        // ---
        let body = r#"{
            "id": 7,
            "title": "Tomato Soup",
            "readyInMinutes": 25,
            "servings": 4,
            "summary": "A <b>classic</b> soup.",
            "extendedIngredients": [
                { "name": "tomato", "amount": 6.0, "unit": "", "original": "6 ripe tomatoes" }
            ],
            "analyzedInstructions": [
                { "steps": [ { "number": 1, "step": "Chop tomatoes." } ] }
            ],
            "nutrition": {
                "nutrients": [
                    { "name": "Calories", "amount": 180.4 },
                    { "name": "Protein", "amount": 4.2 },
                    { "name": "Carbohydrates", "amount": 30.1 },
                    { "name": "Fat", "amount": 5.5 }
                ]
            }
        }"#;

        let details = serde_json::from_str::<InformationResponse>(body)
            .unwrap()
            .into_details();

        assert_eq!(details.summary.as_deref(), Some("A classic soup."));
        assert_eq!(details.nutrition.calories, 180);
        assert_eq!(details.ingredients.len(), 1);
        assert_eq!(details.instructions[0].step, "Chop tomatoes.");
    }

    #[test]
    fn complex_search_missing_results_is_empty() {
        // ---
        let body: ComplexSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(body.results.is_empty());
    }

    #[test]
    fn strip_tags_removes_markup_only() {
        // ---
        assert_eq!(strip_tags("plain text"), "plain text");
        assert_eq!(strip_tags("a <b>bold</b> claim"), "a bold claim");
        assert_eq!(strip_tags("<a href=\"x\">link</a>"), "link");
    }
}
