//! User-visible notices.
//!
//! The console surfaces short success/error messages to whoever is driving
//! it (a terminal, a UI shell, a test harness). The [`Notify`] trait is the
//! seam; production code logs through `tracing`, tests record messages for
//! assertions.

use std::sync::Mutex;

/// Severity of a surfaced notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Sink for user-visible notices.
pub trait Notify: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier: emits notices as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "crmctl::notice", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "crmctl::notice", "{message}");
    }
}

/// Notifier that records every notice, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(level, _)| *level == NoticeLevel::Error)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Notify for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((NoticeLevel::Success, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((NoticeLevel::Error, message.to_string()));
    }
}
