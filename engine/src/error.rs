//! Engine error handling
//!
//! Errors never leave a store's public operations: each boundary logs the
//! error and turns it into a [`Notice`](crate::notices::Notice).

use thiserror::Error;
use tracing::error;

use crate::notices::{Notice, NoticeKind};

/// Error raised inside an engine operation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage request failed: {0}")]
    Collaborator(#[from] anyhow::Error),
}

impl EngineError {
    /// User-facing notice for this error, logging collaborator failures
    pub fn to_notice(&self, action: &str) -> Notice {
        match self {
            EngineError::Validation(msg) => Notice::new(NoticeKind::Validation, msg.clone()),
            EngineError::Collaborator(err) => {
                error!(action, "Storage error: {:?}", err);
                Notice::new(
                    NoticeKind::Failure,
                    format!("{} failed. Please try again.", action),
                )
            }
        }
    }
}

/// Result type alias for engine internals
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_notice_kind() {
        let notice = EngineError::Validation("Weight must be at least 20 kg".to_string())
            .to_notice("Update weight");
        assert_eq!(notice.kind, NoticeKind::Validation);
        assert_eq!(notice.message, "Weight must be at least 20 kg");
    }

    #[test]
    fn test_collaborator_notice_hides_details() {
        let notice = EngineError::from(anyhow::anyhow!("connection reset by peer"))
            .to_notice("Adding food");
        assert_eq!(notice.kind, NoticeKind::Failure);
        assert!(!notice.message.contains("connection reset"));
    }
}
