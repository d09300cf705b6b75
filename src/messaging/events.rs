//! Event types broadcast on the bus.
//!
//! Events represent things that have happened (past tense).

use std::time::Duration;

/// Severity of a user-facing notification toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// How long a toast of this severity stays on screen before
    /// auto-dismissing.
    pub fn auto_close(&self) -> Duration {
        match self {
            Severity::Info => Duration::from_millis(2000),
            Severity::Warning => Duration::from_millis(3000),
            Severity::Error => Duration::from_millis(2000),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "error",
        }
    }
}

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// A transient, auto-dismissing toast for the user
    Notification { severity: Severity, message: String },

    /// A sound was handed to the output device
    PlaybackStarted { url: String },

    /// Application is shutting down
    Shutdown,
}

impl Event {
    /// Convenience constructor for toast notifications.
    pub fn notification(severity: Severity, message: impl Into<String>) -> Self {
        Event::Notification {
            severity,
            message: message.into(),
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Event::Notification { severity, message } => {
                format!("[{}] {}", severity.label(), message)
            }
            Event::PlaybackStarted { url } => format!("Playing: {}", url),
            Event::Shutdown => "Shutting down".to_string(),
        }
    }
}
