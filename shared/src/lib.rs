//! Nutrition Tracker Shared Library
//!
//! This crate contains the data model, the formula library and validation
//! shared by the engine and the WASM module. Nothing in here performs I/O.

pub mod calculations;
pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use calculations::calculate_nutrition;
pub use errors::*;
pub use health_metrics::*;
pub use models::*;
pub use types::*;
