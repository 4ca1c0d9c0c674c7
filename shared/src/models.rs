//! Data models for the nutrition tracker

use crate::errors::ParseEnumError;
use crate::health_metrics::{ActivityLevel, FitnessGoal, Gender, MacroGrams, MacroRatio};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Settings and Targets
// ============================================================================

/// A user's physical and behavioral profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionSettings {
    /// Age in years
    pub age: u32,
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimeters
    pub height: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    /// Premium-only override of the goal's default split
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_macro_ratio: Option<MacroRatio>,
}

impl Default for NutritionSettings {
    fn default() -> Self {
        Self {
            age: 30,
            weight: 70.0,
            height: 170.0,
            gender: Gender::default(),
            activity_level: ActivityLevel::default(),
            fitness_goal: FitnessGoal::default(),
            custom_macro_ratio: None,
        }
    }
}

/// Targets derived from [`NutritionSettings`]; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionCalculations {
    pub bmr: i64,
    pub tdee: i64,
    pub calorie_target: i64,
    /// Rounded grams
    pub macros: MacroGrams,
    /// Integer percentages actually used for the split
    pub macro_ratios: MacroRatio,
}

// ============================================================================
// Meals
// ============================================================================

/// Meal bucket within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(ParseEnumError::new("meal type", s)),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged food consumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: Uuid,
    pub food_name: String,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub serving_size: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A meal row as the store returns it, before the meal type is checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMeal {
    pub id: Uuid,
    pub food_name: String,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: String,
    pub serving_size: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl StoredMeal {
    /// Convert into a typed entry; fails on an unrecognized meal type
    pub fn into_entry(self) -> Result<MealEntry, ParseEnumError> {
        let meal_type = self.meal_type.parse()?;
        Ok(MealEntry {
            id: self.id,
            food_name: self.food_name,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            meal_type,
            serving_size: self.serving_size,
            date: self.date,
            created_at: self.created_at,
        })
    }
}

impl From<MealEntry> for StoredMeal {
    fn from(entry: MealEntry) -> Self {
        Self {
            id: entry.id,
            food_name: entry.food_name,
            calories: entry.calories,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
            meal_type: entry.meal_type.as_str().to_string(),
            serving_size: entry.serving_size,
            date: entry.date,
            created_at: entry.created_at,
        }
    }
}

/// Input for inserting a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntryDraft {
    pub food_name: String,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub serving_size: String,
    pub date: NaiveDate,
}

// ============================================================================
// Ledger and Totals
// ============================================================================

/// Resolution of accumulated totals: hundredths of a gram (or kcal)
const TOTALS_SCALE: f64 = 100.0;

fn to_hundredths(value: f64) -> i64 {
    (value * TOTALS_SCALE).round() as i64
}

fn from_hundredths(value: i64) -> f64 {
    value as f64 / TOTALS_SCALE
}

/// Apply `delta` to `total` in fixed point, never going below zero
///
/// Every total is a whole number of hundredths, so the result depends only
/// on which entries were added and removed, not on the order.
fn step(total: f64, delta: f64, sign: i64) -> f64 {
    from_hundredths((to_hundredths(total) + sign * to_hundredths(delta)).max(0))
}

/// Summed nutrients across a set of meals
///
/// Values are kept at 0.01 precision so adding and then subtracting an entry
/// restores the previous totals exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutrientTotals {
    pub fn add_entry(&mut self, entry: &MealEntry) {
        self.apply(entry, 1);
    }

    /// Reverse [`add_entry`](Self::add_entry), never going below zero
    pub fn subtract_entry(&mut self, entry: &MealEntry) {
        self.apply(entry, -1);
    }

    fn apply(&mut self, entry: &MealEntry, sign: i64) {
        self.calories = step(self.calories, entry.calories as f64, sign);
        self.protein = step(self.protein, entry.protein, sign);
        self.carbs = step(self.carbs, entry.carbs, sign);
        self.fat = step(self.fat, entry.fat, sign);
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Meals for one calendar date, grouped by meal type
///
/// Every bucket always exists, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLedger {
    pub date: NaiveDate,
    pub breakfast: Vec<MealEntry>,
    pub lunch: Vec<MealEntry>,
    pub dinner: Vec<MealEntry>,
    pub snack: Vec<MealEntry>,
}

impl MealLedger {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: Vec::new(),
            lunch: Vec::new(),
            dinner: Vec::new(),
            snack: Vec::new(),
        }
    }

    pub fn bucket(&self, meal_type: MealType) -> &[MealEntry] {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snack => &self.snack,
        }
    }

    pub fn bucket_mut(&mut self, meal_type: MealType) -> &mut Vec<MealEntry> {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snack => &mut self.snack,
        }
    }

    /// All entries in bucket order
    pub fn entries(&self) -> impl Iterator<Item = &MealEntry> {
        MealType::ALL
            .into_iter()
            .flat_map(move |meal_type| self.bucket(meal_type).iter())
    }

    pub fn len(&self) -> usize {
        MealType::ALL.iter().map(|t| self.bucket(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries().any(|entry| entry.id == id)
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Metric series the store keeps for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Weight,
    Height,
    Age,
    ActivityLevel,
    FitnessGoal,
    Gender,
    MacroProtein,
    MacroCarbs,
    MacroFats,
}

impl MetricType {
    /// Series read when loading the body profile
    pub const PROFILE: [MetricType; 6] = [
        MetricType::Weight,
        MetricType::Height,
        MetricType::Age,
        MetricType::ActivityLevel,
        MetricType::FitnessGoal,
        MetricType::Gender,
    ];

    /// Series holding the custom macro split
    pub const MACROS: [MetricType; 3] = [
        MetricType::MacroProtein,
        MetricType::MacroCarbs,
        MetricType::MacroFats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Weight => "weight",
            MetricType::Height => "height",
            MetricType::Age => "age",
            MetricType::ActivityLevel => "activity_level",
            MetricType::FitnessGoal => "fitness_goal",
            MetricType::Gender => "gender",
            MetricType::MacroProtein => "macro_protein",
            MetricType::MacroCarbs => "macro_carbs",
            MetricType::MacroFats => "macro_fats",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored metric value; numbers and enum strings share one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view; numeric text is accepted
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            MetricValue::Number(_) => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

/// One point in a metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub value: MetricValue,
    pub recorded_at: DateTime<Utc>,
}

/// Input for recording a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricWrite {
    pub metric_type: MetricType,
    pub value: MetricValue,
}
