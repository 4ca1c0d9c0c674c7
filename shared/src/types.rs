//! Request types handed to the engine by presentation code

use crate::validation::{sanitize_calories, sanitize_nutrient};
use serde::{Deserialize, Serialize};

/// A food the user wants to log
///
/// Numeric fields come straight from forms or catalog lookups and may be
/// missing or NaN; [`FoodInput::sanitized`] turns them into storable values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodInput {
    pub food_name: String,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub serving_size: Option<String>,
}

/// Storable nutrient values for a [`FoodInput`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanitizedNutrients {
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl FoodInput {
    pub fn new(food_name: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            food_name: food_name.to_string(),
            calories: Some(calories),
            protein: Some(protein),
            carbs: Some(carbs),
            fat: Some(fat),
            serving_size: None,
        }
    }

    pub fn with_serving_size(mut self, serving_size: &str) -> Self {
        self.serving_size = Some(serving_size.to_string());
        self
    }

    /// Calories rounded, missing or NaN values defaulted to 0
    pub fn sanitized(&self) -> SanitizedNutrients {
        SanitizedNutrients {
            calories: sanitize_calories(self.calories),
            protein: sanitize_nutrient(self.protein),
            carbs: sanitize_nutrient(self.carbs),
            fat: sanitize_nutrient(self.fat),
        }
    }
}
