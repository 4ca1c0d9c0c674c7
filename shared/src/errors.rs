//! Error types shared by the calculation and model layers

use thiserror::Error;

/// Errors raised by the nutrition calculation pipeline
///
/// None of these are fatal: the calculator keeps its previous result and
/// logs the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("Invalid input: {field} must be a positive number (got {value})")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("Invalid {stage} result: {value}")]
    InvalidResult { stage: &'static str, value: f64 },
}

/// Error parsing a wire string into one of the model enums
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
