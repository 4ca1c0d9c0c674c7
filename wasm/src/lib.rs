//! Nutrition Tracker WASM Module
//!
//! Browser bindings for the nutrition formulas, so forms can preview targets
//! before settings are saved. Enum arguments use their stored string form
//! (`"male"`, `"very_active"`, `"weight_loss"`).

use nutrition_tracker_shared::{ActivityLevel, FitnessGoal, Gender, NutritionSettings};
use wasm_bindgen::prelude::*;

fn parse<T: std::str::FromStr>(value: &str) -> Result<T, JsValue>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| JsValue::from_str(&e.to_string()))
}

/// Mifflin-St Jeor BMR in kcal/day
#[wasm_bindgen]
pub fn calculate_bmr(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: &str,
) -> Result<f64, JsValue> {
    let gender: Gender = parse(gender)?;
    Ok(nutrition_tracker_shared::calculate_bmr(
        weight_kg, height_cm, age_years, gender,
    ))
}

/// BMR scaled by the activity multiplier
#[wasm_bindgen]
pub fn calculate_tdee(bmr: f64, activity_level: &str) -> Result<f64, JsValue> {
    let level: ActivityLevel = parse(activity_level)?;
    Ok(nutrition_tracker_shared::calculate_tdee(bmr, level))
}

/// TDEE adjusted for the fitness goal
#[wasm_bindgen]
pub fn calculate_calorie_target(tdee: f64, fitness_goal: &str) -> Result<f64, JsValue> {
    let goal: FitnessGoal = parse(fitness_goal)?;
    Ok(nutrition_tracker_shared::calculate_calorie_target(tdee, goal))
}

/// Label for an activity level picker, e.g. "Moderate exercise 3-5 days/week"
#[wasm_bindgen]
pub fn activity_level_description(activity_level: &str) -> Result<String, JsValue> {
    let level: ActivityLevel = parse(activity_level)?;
    Ok(level.description().to_string())
}

/// Full pipeline: settings JSON in, calculations JSON out
#[wasm_bindgen]
pub fn calculate_nutrition(settings_json: &str) -> Result<String, JsValue> {
    let settings: NutritionSettings = serde_json::from_str(settings_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?;
    let calculations = nutrition_tracker_shared::calculate_nutrition(&settings)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&calculations).map_err(|e| JsValue::from_str(&e.to_string()))
}
