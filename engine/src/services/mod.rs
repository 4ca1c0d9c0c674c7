//! Engine services
//!
//! Each store owns one piece of state and publishes it through a watch
//! channel; presentation code subscribes and calls the operations.

pub mod calculator;
pub mod ledger;
pub mod meals;
pub mod nutrition;
pub mod settings;

pub use calculator::{calculate_nutrition, NutritionCalculator};
pub use ledger::{LedgerSnapshot, LoadOutcome, LoadState, LoadToken, MealLedgerStore};
pub use meals::MutationOutcome;
pub use nutrition::{
    aggregate_nutrients, ledger_totals, remaining_against_target, NutrientProgress,
    RemainingNutrients,
};
pub use settings::{SettingUpdate, SettingsStore, UpdateOutcome};
