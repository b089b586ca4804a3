//! Ingredient label cleanup between the image detector and the matcher.
//!
//! The detector emits noisy labels: low-confidence guesses, generic category
//! words ("food", "produce"), duplicates differing only in case. This module
//! reduces them to a short, deduplicated, title-cased ingredient list. The
//! transform is deterministic and idempotent, so re-running it over its own
//! output changes nothing.

use crate::error::PipelineError;
use crate::models::{DetectedIngredient, RawLabel};

// ---

/// Labels at or below this confidence are dropped.
const CONFIDENCE_FLOOR: f32 = 0.6;

/// Maximum number of ingredients forwarded to recipe search.
const MAX_INGREDIENTS: usize = 10;

/// Generic category words the detector emits that are not ingredients.
const CATEGORY_STOPLIST: &[&str] = &[
    "food",
    "vegetable",
    "fruit",
    "meat",
    "ingredient",
    "produce",
    "cuisine",
    "dish",
    "plant",
    "natural foods",
];

// ---

/// Clean raw detector labels into a deduplicated ingredient list.
///
/// Drops labels scoring ≤ 0.6 and category-word noise, title-cases the
/// survivors, deduplicates by exact post-normalization equality (first-seen
/// order wins), and truncates to 10 entries.
///
/// Fails with [`PipelineError::DetectionEmpty`] when nothing survives.
pub fn normalize(raw_labels: &[RawLabel]) -> Result<Vec<DetectedIngredient>, PipelineError> {
    // ---
    let mut ingredients: Vec<DetectedIngredient> = Vec::new();

    for label in raw_labels {
        if label.score <= CONFIDENCE_FLOOR {
            continue;
        }

        let lowered = label.name.to_lowercase();
        if CATEGORY_STOPLIST.contains(&lowered.as_str()) {
            continue;
        }

        let name = title_case(&label.name);
        if ingredients.iter().any(|i| i.name == name) {
            continue;
        }

        ingredients.push(DetectedIngredient {
            name,
            confidence: label.score,
        });

        if ingredients.len() == MAX_INGREDIENTS {
            break;
        }
    }

    if ingredients.is_empty() {
        return Err(PipelineError::DetectionEmpty);
    }

    Ok(ingredients)
}

/// First letter uppercased, remainder lowercased.
fn title_case(s: &str) -> String {
    // ---
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn label(name: &str, score: f32) -> RawLabel {
        RawLabel {
            name: name.to_string(),
            score,
        }
    }

    #[test]
    fn drops_low_confidence_labels() {
        // ---
        let raw = vec![
            label("tomato", 0.95),
            label("basil", 0.6), // at the floor, dropped
            label("garlic", 0.59),
        ];

        let out = normalize(&raw).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Tomato");
        assert_eq!(out[0].confidence, 0.95);
    }

    #[test]
    fn drops_category_stoplist_case_insensitively() {
        // ---
        let raw = vec![
            label("Food", 0.99),
            label("Natural Foods", 0.98),
            label("PRODUCE", 0.97),
            label("carrot", 0.9),
        ];

        let out = normalize(&raw).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Carrot");
    }

    #[test]
    fn title_cases_and_dedupes_preserving_first_seen_order() {
        // ---
        let raw = vec![
            label("RED onion", 0.9),
            label("Chicken breast", 0.85),
            label("red ONION", 0.8),
        ];

        let out = normalize(&raw).unwrap();
        let names: Vec<&str> = out.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Red onion", "Chicken breast"]);
        // First-seen label's confidence wins.
        assert_eq!(out[0].confidence, 0.9);
    }

    #[test]
    fn truncates_to_ten_entries() {
        // ---
        let raw: Vec<RawLabel> = (0..15).map(|i| label(&format!("item{i}"), 0.9)).collect();
        let out = normalize(&raw).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out[0].name, "Item0");
        assert_eq!(out[9].name, "Item9");
    }

    #[test]
    fn empty_result_is_detection_empty() {
        // ---
        assert!(matches!(normalize(&[]), Err(PipelineError::DetectionEmpty)));

        let all_noise = vec![label("food", 0.99), label("pepper", 0.3)];
        assert!(matches!(
            normalize(&all_noise),
            Err(PipelineError::DetectionEmpty)
        ));
    }

    #[test]
    fn idempotent_over_its_own_output() {
        // ---
        let raw = vec![
            label("tomato", 0.95),
            label("TOMATO", 0.9),
            label("dish", 0.99),
            label("fresh basil", 0.7),
        ];

        let once = normalize(&raw).unwrap();
        let as_labels: Vec<RawLabel> = once
            .iter()
            .map(|i| label(&i.name, i.confidence))
            .collect();
        let twice = normalize(&as_labels).unwrap();

        assert_eq!(once, twice);
    }
}
