//! Nutrition Tracker Engine Library
//!
//! Calculates daily nutrition targets from a user's profile and keeps the
//! per-date meal ledger with its running totals.

pub mod config;
pub mod error;
pub mod notices;
pub mod repositories;
pub mod services;
pub mod state;

pub use state::NutritionEngine;
