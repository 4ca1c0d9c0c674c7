//! Nutrition target pipeline
//!
//! Chains the formulas in [`crate::health_metrics`] for one settings value,
//! checking every intermediate result before it feeds the next stage.

use crate::errors::CalculationError;
use crate::health_metrics::{
    calculate_bmr, calculate_calorie_target, calculate_macro_grams, calculate_tdee,
    default_macro_ratios, normalize_macro_ratio, MacroGrams,
};
use crate::models::{NutritionCalculations, NutritionSettings};

fn positive_input(field: &'static str, value: f64) -> Result<f64, CalculationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalculationError::InvalidInput { field, value })
    }
}

fn positive_result(stage: &'static str, value: f64) -> Result<f64, CalculationError> {
    if value.is_nan() || value <= 0.0 {
        Err(CalculationError::InvalidResult { stage, value })
    } else {
        Ok(value)
    }
}

/// Run the full formula pipeline for one settings value
///
/// Pure: identical settings always produce bit-identical results.
pub fn calculate_nutrition(
    settings: &NutritionSettings,
) -> Result<NutritionCalculations, CalculationError> {
    let weight = positive_input("weight", settings.weight)?;
    let height = positive_input("height", settings.height)?;
    positive_input("age", settings.age as f64)?;

    let bmr = positive_result(
        "bmr",
        calculate_bmr(weight, height, settings.age, settings.gender),
    )?;
    let tdee = positive_result("tdee", calculate_tdee(bmr, settings.activity_level))?;
    let calorie_target = positive_result(
        "calorie target",
        calculate_calorie_target(tdee, settings.fitness_goal),
    )?;

    let ratios = normalize_macro_ratio(
        settings
            .custom_macro_ratio
            .unwrap_or_else(|| default_macro_ratios(settings.fitness_goal)),
    );

    let grams = calculate_macro_grams(calorie_target, &ratios);
    for (stage, value) in [
        ("protein grams", grams.protein),
        ("carbs grams", grams.carbs),
        ("fats grams", grams.fats),
    ] {
        if value.is_nan() || value < 0.0 {
            return Err(CalculationError::InvalidResult { stage, value });
        }
    }

    Ok(NutritionCalculations {
        bmr: bmr.round() as i64,
        tdee: tdee.round() as i64,
        calorie_target: calorie_target.round() as i64,
        macros: MacroGrams {
            protein: grams.protein.round(),
            carbs: grams.carbs.round(),
            fats: grams.fats.round(),
        },
        macro_ratios: ratios,
    })
}
