//! Nutrient aggregation - totals over meals and progress against targets

use nutrition_tracker_shared::{MealEntry, MealLedger, NutrientTotals, NutritionCalculations};
use serde::Serialize;

/// Sum calories and macros over any set of meals
pub fn aggregate_nutrients<'a>(meals: impl IntoIterator<Item = &'a MealEntry>) -> NutrientTotals {
    meals
        .into_iter()
        .fold(NutrientTotals::default(), |mut totals, entry| {
            totals.add_entry(entry);
            totals
        })
}

/// Totals across every bucket of a ledger
pub fn ledger_totals(ledger: &MealLedger) -> NutrientTotals {
    aggregate_nutrients(ledger.entries())
}

/// Amount left and share consumed for one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientProgress {
    pub target: f64,
    pub consumed: f64,
    /// Never negative
    pub remaining: f64,
    /// 0 when the target is 0
    pub percent_consumed: f64,
}

impl NutrientProgress {
    fn new(target: f64, consumed: f64) -> Self {
        let percent_consumed = if target > 0.0 {
            (consumed / target * 100.0).round()
        } else {
            0.0
        };
        Self {
            target,
            consumed,
            remaining: (target - consumed).max(0.0),
            percent_consumed,
        }
    }
}

/// Daily progress for calories and each macro
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemainingNutrients {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fat: NutrientProgress,
}

/// Compare consumed totals with the calculated daily targets
pub fn remaining_against_target(
    totals: &NutrientTotals,
    calculations: &NutritionCalculations,
) -> RemainingNutrients {
    RemainingNutrients {
        calories: NutrientProgress::new(calculations.calorie_target as f64, totals.calories),
        protein: NutrientProgress::new(calculations.macros.protein, totals.protein),
        carbs: NutrientProgress::new(calculations.macros.carbs, totals.carbs),
        fat: NutrientProgress::new(calculations.macros.fats, totals.fat),
    }
}
