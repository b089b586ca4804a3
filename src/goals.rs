//! Daily calorie target calculation (Harris-Benedict revised).
//!
//! The target is derived in three steps: BMR from the sex-specific
//! closed-form branch, TDEE from the activity multiplier, then the goal
//! offset applied and rounded. Inputs are validated here rather than at the
//! UI boundary so a zero or garbage weight can never produce an absurd BMR.
//!
//! The raw formula carries no minimum-calorie floor: a light, sedentary
//! "lose" profile can compute a very low target. Whether to clamp is a
//! product decision that has not been made.

use crate::error::PipelineError;
use crate::models::{Profile, ProfileInput, Sex};

// ---

/// Compute the daily calorie target for a validated profile input.
///
/// Fails with [`PipelineError::InvalidProfile`] when weight, height, or age
/// is non-positive or non-finite.
pub fn compute_daily_calories(input: &ProfileInput) -> Result<i32, PipelineError> {
    // ---
    validate(input)?;

    let bmr = match input.sex {
        Sex::Male => {
            88.362 + 13.397 * input.weight_kg + 4.799 * input.height_cm - 5.677 * input.age_years
        }
        Sex::Female => {
            447.593 + 9.247 * input.weight_kg + 3.098 * input.height_cm - 4.330 * input.age_years
        }
    };

    let tdee = bmr * input.activity.multiplier();
    let target = tdee + f64::from(input.goal.offset_kcal());

    Ok(target.round() as i32)
}

/// Build the stored profile, deriving the calorie target from the inputs.
pub fn build_profile(input: ProfileInput) -> Result<Profile, PipelineError> {
    // ---
    let daily_calorie_target = compute_daily_calories(&input)?;

    Ok(Profile {
        sex: input.sex,
        age_years: input.age_years,
        weight_kg: input.weight_kg,
        height_cm: input.height_cm,
        activity: input.activity,
        goal: input.goal,
        daily_calorie_target,
    })
}

// ---

fn validate(input: &ProfileInput) -> Result<(), PipelineError> {
    // ---
    let checks = [
        ("weight_kg", input.weight_kg),
        ("height_cm", input.height_cm),
        ("age_years", input.age_years),
    ];

    for (field, value) in checks {
        if !value.is_finite() || value <= 0.0 {
            return Err(PipelineError::InvalidProfile(format!(
                "{field} must be a positive number, got {value}"
            )));
        }
    }

    Ok(())
}
