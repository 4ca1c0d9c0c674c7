//! Health metrics calculations module
//!
//! Provides the formula pipeline that turns a body profile into daily energy
//! and macronutrient targets: BMR, TDEE, calorie target and macro grams.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Evidence-Based**: Mifflin-St Jeor for resting expenditure
//! 3. **Type Safety**: Enums make unknown activity levels or goals unrepresentable

use crate::errors::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Energy per gram of protein and carbohydrate (kcal)
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
/// Energy per gram of fat (kcal)
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Allowed distance from 100 for a user-supplied macro ratio
pub const MACRO_RATIO_TOLERANCE: f64 = 1.0;

// ============================================================================
// Profile Types
// ============================================================================

/// Gender used for the BMR constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
    /// Uses the midpoint between the male and female constants
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Constant added to the Mifflin-St Jeor base
    pub fn bmr_offset(&self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
            Gender::Other => -78.0,
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ParseEnumError::new("gender", s)),
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    #[default]
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise, physical job
    VeryActive,
}

impl ActivityLevel {
    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::Light => "Light exercise 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise 3-5 days/week",
            ActivityLevel::Active => "Hard exercise 6-7 days/week",
            ActivityLevel::VeryActive => "Very hard exercise or physical job",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(ParseEnumError::new("activity level", s)),
        }
    }
}

/// What the user wants their intake to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    #[default]
    Maintenance,
    MassBuilding,
}

impl FitnessGoal {
    /// Multiplier applied to TDEE to get the daily calorie target
    pub fn calorie_factor(&self) -> f64 {
        match self {
            // Fixed 20% deficit
            FitnessGoal::WeightLoss => 0.8,
            FitnessGoal::Maintenance => 1.0,
            // Fixed 15% surplus
            FitnessGoal::MassBuilding => 1.15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "weight_loss",
            FitnessGoal::Maintenance => "maintenance",
            FitnessGoal::MassBuilding => "mass_building",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight_loss" => Ok(FitnessGoal::WeightLoss),
            "maintenance" => Ok(FitnessGoal::Maintenance),
            "mass_building" => Ok(FitnessGoal::MassBuilding),
            _ => Err(ParseEnumError::new("fitness goal", s)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Gender, ActivityLevel, FitnessGoal);

// ============================================================================
// Macro Ratios
// ============================================================================

/// Percentage split of the calorie target across protein, carbs and fats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroRatio {
    pub const fn new(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein,
            carbs,
            fats,
        }
    }

    pub fn sum(&self) -> f64 {
        self.protein + self.carbs + self.fats
    }
}

/// Gram amounts of each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MacroGrams {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Default split used when no custom ratio is set
pub fn default_macro_ratios(goal: FitnessGoal) -> MacroRatio {
    match goal {
        FitnessGoal::WeightLoss => MacroRatio::new(40.0, 30.0, 30.0),
        FitnessGoal::Maintenance => MacroRatio::new(30.0, 40.0, 30.0),
        FitnessGoal::MassBuilding => MacroRatio::new(30.0, 45.0, 25.0),
    }
}

/// Whether a user-supplied ratio is close enough to 100% to accept
pub fn macro_ratio_sum_is_valid(ratio: &MacroRatio) -> bool {
    let sum = ratio.sum();
    sum.is_finite() && (sum - 100.0).abs() <= MACRO_RATIO_TOLERANCE
}

/// Rescale a ratio so its components sum to 100
///
/// Each component is scaled proportionally and rounded to an integer
/// percentage, so the result sums to 100 within rounding. A ratio that
/// already sums to exactly 100 is returned untouched. A zero or non-finite
/// sum cannot be rescaled and is also returned untouched.
pub fn normalize_macro_ratio(ratio: MacroRatio) -> MacroRatio {
    let sum = ratio.sum();
    if sum == 100.0 || sum <= 0.0 || !sum.is_finite() {
        return ratio;
    }

    let scale = 100.0 / sum;
    MacroRatio {
        protein: (ratio.protein * scale).round(),
        carbs: (ratio.carbs * scale).round(),
        fats: (ratio.fats * scale).round(),
    }
}

// ============================================================================
// BMR, TDEE and Targets
// ============================================================================

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + s,
/// where s is +5 (male), -161 (female) or -78 (other).
///
/// Callers must validate that the result is positive.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64 + gender.bmr_offset()
}

/// Calculate Total Daily Energy Expenditure
///
/// TDEE = BMR × Activity Multiplier
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Adjust TDEE for the user's goal
pub fn calculate_calorie_target(tdee: f64, goal: FitnessGoal) -> f64 {
    tdee * goal.calorie_factor()
}

/// Split a calorie target into grams using 4/4/9 kcal per gram
///
/// `ratios` must already be normalized.
pub fn calculate_macro_grams(calorie_target: f64, ratios: &MacroRatio) -> MacroGrams {
    MacroGrams {
        protein: calorie_target * ratios.protein / 100.0 / KCAL_PER_GRAM_PROTEIN,
        carbs: calorie_target * ratios.carbs / 100.0 / KCAL_PER_GRAM_CARBS,
        fats: calorie_target * ratios.fats / 100.0 / KCAL_PER_GRAM_FAT,
    }
}
