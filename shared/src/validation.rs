//! Input validation functions
//!
//! This module provides validation utilities for user input. Everything here
//! runs before any I/O, so a rejected value never reaches the store.

use crate::health_metrics::{macro_ratio_sum_is_valid, MacroRatio};

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm (covers infants to tallest recorded humans)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age_years: u32) -> Result<(), String> {
    if age_years < 1 {
        return Err("Age must be at least 1 year".to_string());
    }
    if age_years > 150 {
        return Err("Age cannot exceed 150 years".to_string());
    }
    Ok(())
}

/// Validate percentage value (0-100)
pub fn validate_percentage(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("Percentage must be a valid number".to_string());
    }
    if !(0.0..=100.0).contains(&value) {
        return Err("Percentage must be between 0 and 100".to_string());
    }
    Ok(())
}

/// Validate a custom macro split
///
/// Each component must be a percentage and the three must sum to 100 ± 1.
pub fn validate_macro_ratio(ratio: &MacroRatio) -> Result<(), String> {
    for (name, value) in [
        ("Protein", ratio.protein),
        ("Carbs", ratio.carbs),
        ("Fats", ratio.fats),
    ] {
        validate_percentage(value).map_err(|e| format!("{}: {}", name, e))?;
    }
    if !macro_ratio_sum_is_valid(ratio) {
        return Err(format!(
            "Macro percentages must add up to 100 (got {})",
            ratio.sum()
        ));
    }
    Ok(())
}

/// Coerce a nutrient amount to something storable: missing, NaN, infinite or
/// negative amounts become 0
pub fn sanitize_nutrient(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Round a calorie amount to a whole, non-negative number
pub fn sanitize_calories(value: Option<f64>) -> u32 {
    let kcal = sanitize_nutrient(value).round();
    if kcal >= u32::MAX as f64 {
        u32::MAX
    } else {
        kcal as u32
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "weight" => "Current Weight",
        "height" => "Height",
        "age" => "Age",
        "gender" => "Gender",
        "activity_level" => "Activity Level",
        "fitness_goal" => "Fitness Goal",
        "custom_macro_ratio" => "Macro Split",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}
