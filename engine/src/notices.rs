//! User-facing notices
//!
//! Stores report failures, rejected input and gated features on a broadcast
//! side channel instead of returning errors to presentation code.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// What a notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A storage request failed; the user can retry
    Failure,
    /// Input was rejected before any request was made
    Validation,
    /// Informational, e.g. a premium-only feature was requested
    Info,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Cloneable handle for publishing notices
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish a notice; with nobody listening it is only logged
    pub fn notify(&self, notice: Notice) {
        debug!(kind = ?notice.kind, message = %notice.message, "Notice");
        let _ = self.tx.send(notice);
    }

    pub fn failure(&self, message: impl Into<String>) {
        self.notify(Notice::new(NoticeKind::Failure, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notice::new(NoticeKind::Info, message));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}
