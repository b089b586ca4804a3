//! Recipe candidate matching and nutrition reconciliation.
//!
//! The matcher turns a normalized ingredient list into a ranked candidate
//! set in four steps: candidate search (up to 10, upstream-ranked by used
//! ingredients), concurrent nutrition enrichment of the first 5, match-score
//! computation, and a calorie-window filter derived from the daily target.
//!
//! Enrichment isolation is the central resilience property here: each of the
//! 5 nutrition calls lands in its own indexed slot, and a failed call costs
//! only that candidate its facts (zeroed, match score 0) while the other four
//! survive. Only the candidate *search* failing aborts the match.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::clients::RecipeSearch;
use crate::error::PipelineError;
use crate::models::{CandidateHit, DetectedIngredient, DietHint, NutritionFacts, RecipeCandidate};

// ---

/// Candidates requested from the search upstream.
const SEARCH_LIMIT: u32 = 10;

/// Candidates selected for nutrition enrichment (= fan-out cap).
const ENRICH_LIMIT: usize = 5;

/// Meals assumed per day when deriving the per-meal calorie window.
const MEALS_PER_DAY: f64 = 3.0;

/// Calorie tolerance around the per-meal window, inclusive.
const WINDOW_TOLERANCE_KCAL: f64 = 300.0;

pub struct RecipeMatcher {
    search: Arc<dyn RecipeSearch>,
}

impl RecipeMatcher {
    // ---
    pub fn new(search: Arc<dyn RecipeSearch>) -> Self {
        Self { search }
    }

    /// Rank recipe candidates for the detected ingredients under the user's
    /// calorie target.
    ///
    /// Returns the window-filtered enriched set, or the full enriched set
    /// when nothing falls inside the window (partial relevance beats no
    /// result). Fails with [`PipelineError::DetectionEmpty`] on empty input,
    /// [`PipelineError::NoCandidates`] when the search finds nothing, and
    /// [`PipelineError::UpstreamUnavailable`] only when the search call
    /// itself fails.
    pub async fn match_recipes(
        &self,
        ingredients: &[DetectedIngredient],
        daily_calorie_target: i32,
        diet_hint: Option<DietHint>,
    ) -> Result<Vec<RecipeCandidate>, PipelineError> {
        // ---
        if ingredients.is_empty() {
            return Err(PipelineError::DetectionEmpty);
        }

        let names: Vec<String> = ingredients.iter().map(|i| i.name.clone()).collect();
        let hits = self
            .search
            .find_by_ingredients(&names, diet_hint, SEARCH_LIMIT)
            .await?;

        if hits.is_empty() {
            return Err(PipelineError::NoCandidates);
        }

        let selected: Vec<_> = hits.into_iter().take(ENRICH_LIMIT).collect();
        let slots = self.enrich(&selected).await;

        let enriched: Vec<RecipeCandidate> = selected
            .into_iter()
            .zip(slots)
            .map(|(hit, facts)| {
                let match_percent = match facts {
                    Some(_) => match_percent(hit.used_ingredient_count, hit.missed_ingredient_count),
                    None => 0,
                };
                RecipeCandidate {
                    id: hit.id,
                    title: hit.title,
                    image: hit.image,
                    used_ingredient_count: hit.used_ingredient_count,
                    missed_ingredient_count: hit.missed_ingredient_count,
                    nutrition: facts.unwrap_or_else(NutritionFacts::zero),
                    match_percent,
                }
            })
            .collect();

        // Per-meal window around target/3, inclusive at both bounds.
        let window = f64::from(daily_calorie_target) / MEALS_PER_DAY;
        let lo = window - WINDOW_TOLERANCE_KCAL;
        let hi = window + WINDOW_TOLERANCE_KCAL;

        let filtered: Vec<RecipeCandidate> = enriched
            .iter()
            .filter(|c| {
                let cal = f64::from(c.nutrition.calories);
                cal >= lo && cal <= hi
            })
            .cloned()
            .collect();

        debug!(
            "matched {} of {} candidates inside [{lo:.0}, {hi:.0}] kcal",
            filtered.len(),
            enriched.len()
        );

        if filtered.is_empty() {
            Ok(enriched)
        } else {
            Ok(filtered)
        }
    }

    /// Fan out one nutrition call per selected candidate and join them all.
    ///
    /// Slot `i` belongs to candidate `i` and is written exactly once; a
    /// failed or panicked call leaves its slot `None`.
    async fn enrich(&self, selected: &[CandidateHit]) -> Vec<Option<NutritionFacts>> {
        // ---
        let mut tasks = JoinSet::new();
        for (idx, hit) in selected.iter().enumerate() {
            let search = Arc::clone(&self.search);
            let recipe_id = hit.id;
            tasks.spawn(async move { (idx, search.nutrition(recipe_id).await) });
        }

        let mut slots: Vec<Option<NutritionFacts>> = vec![None; selected.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(facts))) => slots[idx] = Some(facts),
                Ok((idx, Err(e))) => {
                    warn!("nutrition enrichment failed for candidate {idx}: {e}");
                }
                Err(e) => {
                    warn!("nutrition enrichment task aborted: {e}");
                }
            }
        }
        slots
    }
}

/// round(100 × used / (used + missed)); 0 when the denominator is 0.
pub fn match_percent(used: u32, missed: u32) -> u8 {
    // ---
    let denominator = used + missed;
    if denominator == 0 {
        return 0;
    }
    (100.0 * f64::from(used) / f64::from(denominator)).round() as u8
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::clients::RecipeSearch;
    use crate::models::{CandidateHit, RecipeDetails, RecipeSummary};
    use async_trait::async_trait;

    /// Scripted recipe search: fixed hits, per-id nutrition outcomes.
    struct FakeSearch {
        hits: Vec<CandidateHit>,
        /// Recipe ids whose nutrition call should fail.
        failing: Vec<i64>,
        /// Calories returned per recipe id (600 when unlisted).
        calories: Vec<(i64, i32)>,
    }

    impl FakeSearch {
        fn with_hits(hits: Vec<CandidateHit>) -> Self {
            Self {
                hits,
                failing: Vec::new(),
                calories: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl RecipeSearch for FakeSearch {
        // ---
        async fn find_by_ingredients(
            &self,
            _ingredients: &[String],
            _diet: Option<DietHint>,
            _max_results: u32,
        ) -> Result<Vec<CandidateHit>, PipelineError> {
            Ok(self.hits.clone())
        }

        async fn nutrition(&self, recipe_id: i64) -> Result<NutritionFacts, PipelineError> {
            if self.failing.contains(&recipe_id) {
                return Err(PipelineError::upstream("recipe-nutrition", "HTTP 500"));
            }
            let calories = self
                .calories
                .iter()
                .find(|(id, _)| *id == recipe_id)
                .map_or(600, |(_, c)| *c);
            Ok(NutritionFacts {
                calories,
                protein_g: 20.0,
                carbs_g: 30.0,
                fat_g: 10.0,
            })
        }

        async fn details(&self, _recipe_id: i64) -> Result<RecipeDetails, PipelineError> {
            unimplemented!("not used by the matcher")
        }

        async fn search(
            &self,
            _query: &str,
            _max_calories: Option<i32>,
        ) -> Result<Vec<RecipeSummary>, PipelineError> {
            unimplemented!("not used by the matcher")
        }
    }

    fn hit(id: i64, used: u32, missed: u32) -> CandidateHit {
        // ---
        CandidateHit {
            id,
            title: format!("Recipe {id}"),
            image: None,
            used_ingredient_count: used,
            missed_ingredient_count: missed,
        }
    }

    fn ingredient(name: &str) -> DetectedIngredient {
        DetectedIngredient {
            name: name.to_string(),
            confidence: 0.9,
        }
    }

    fn matcher(search: FakeSearch) -> RecipeMatcher {
        RecipeMatcher::new(Arc::new(search))
    }

    // Target 1800 -> window 600 ± 300, i.e. [300, 900].
    const TARGET: i32 = 1800;

    #[tokio::test]
    async fn preserves_upstream_order_and_scores() {
        // ---
        let m = matcher(FakeSearch::with_hits(vec![
            hit(1, 3, 1),
            hit(2, 2, 2),
            hit(3, 1, 4),
        ]));

        let out = m
            .match_recipes(&[ingredient("Tomato")], TARGET, None)
            .await
            .unwrap();

        let ids: Vec<i64> = out.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(out[0].match_percent, 75);
        assert_eq!(out[1].match_percent, 50);
        assert_eq!(out[2].match_percent, 20);
    }

    #[tokio::test]
    async fn empty_ingredients_is_detection_empty() {
        // ---
        let m = matcher(FakeSearch::with_hits(vec![hit(1, 1, 0)]));
        assert!(matches!(
            m.match_recipes(&[], TARGET, None).await,
            Err(PipelineError::DetectionEmpty)
        ));
    }

    #[tokio::test]
    async fn empty_search_is_no_candidates() {
        // ---
        let m = matcher(FakeSearch::with_hits(Vec::new()));
        assert!(matches!(
            m.match_recipes(&[ingredient("Kale")], TARGET, None).await,
            Err(PipelineError::NoCandidates)
        ));
    }

    #[tokio::test]
    async fn search_failure_propagates_as_upstream() {
        // ---
        struct FailingSearch;

        #[async_trait]
        impl RecipeSearch for FailingSearch {
            async fn find_by_ingredients(
                &self,
                _i: &[String],
                _d: Option<DietHint>,
                _m: u32,
            ) -> Result<Vec<CandidateHit>, PipelineError> {
                Err(PipelineError::upstream("recipe-search", "timeout"))
            }
            async fn nutrition(&self, _id: i64) -> Result<NutritionFacts, PipelineError> {
                unreachable!()
            }
            async fn details(&self, _id: i64) -> Result<RecipeDetails, PipelineError> {
                unreachable!()
            }
            async fn search(
                &self,
                _q: &str,
                _m: Option<i32>,
            ) -> Result<Vec<RecipeSummary>, PipelineError> {
                unreachable!()
            }
        }

        let m = RecipeMatcher::new(Arc::new(FailingSearch));
        assert!(matches!(
            m.match_recipes(&[ingredient("Kale")], TARGET, None).await,
            Err(PipelineError::UpstreamUnavailable { provider: "recipe-search", .. })
        ));
    }

    #[tokio::test]
    async fn one_enrichment_failure_still_returns_all_five() {
        // ---
        let mut search = FakeSearch::with_hits(vec![
            hit(1, 3, 1),
            hit(2, 2, 2),
            hit(3, 4, 0),
            hit(4, 1, 1),
            hit(5, 2, 0),
        ]);
        search.failing = vec![3];

        // Target 900 -> window 300 ± 300 = [0, 600], which keeps both the
        // healthy candidates (600 kcal) and the zeroed failure.
        let m = matcher(search);
        let out = m
            .match_recipes(&[ingredient("Tomato")], 900, None)
            .await
            .unwrap();

        assert_eq!(out.len(), 5);

        let failed = out.iter().find(|c| c.id == 3).unwrap();
        assert_eq!(failed.nutrition, NutritionFacts::zero());
        assert_eq!(failed.match_percent, 0);

        for healthy in out.iter().filter(|c| c.id != 3) {
            assert_eq!(healthy.nutrition.calories, 600);
            assert!(healthy.match_percent > 0);
        }
    }

    #[tokio::test]
    async fn only_first_five_are_enriched() {
        // ---
        let hits: Vec<CandidateHit> = (1..=8).map(|id| hit(id, 2, 1)).collect();
        let m = matcher(FakeSearch::with_hits(hits));

        let out = m
            .match_recipes(&[ingredient("Tomato")], TARGET, None)
            .await
            .unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out.last().unwrap().id, 5);
    }

    #[tokio::test]
    async fn window_is_inclusive_at_both_bounds() {
        // ---
        let mut search = FakeSearch::with_hits(vec![
            hit(1, 1, 0),
            hit(2, 1, 0),
            hit(3, 1, 0),
            hit(4, 1, 0),
        ]);
        // Window for 1800 is [300, 900].
        search.calories = vec![(1, 300), (2, 900), (3, 299), (4, 901)];

        let m = matcher(search);
        let out = m
            .match_recipes(&[ingredient("Tomato")], TARGET, None)
            .await
            .unwrap();

        let ids: Vec<i64> = out.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn empty_filter_falls_back_to_full_enriched_set() {
        // ---
        let mut search = FakeSearch::with_hits(vec![hit(1, 1, 0), hit(2, 2, 1)]);
        // Both far outside the [300, 900] window.
        search.calories = vec![(1, 2000), (2, 2500)];

        let m = matcher(search);
        let out = m
            .match_recipes(&[ingredient("Tomato")], TARGET, None)
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].nutrition.calories, 2000);
    }

    #[test]
    fn match_percent_bounds() {
        // ---
        assert_eq!(match_percent(0, 0), 0);
        assert_eq!(match_percent(5, 0), 100);
        assert_eq!(match_percent(0, 5), 0);
        assert_eq!(match_percent(1, 2), 33);
        assert_eq!(match_percent(2, 1), 67);
    }
}
