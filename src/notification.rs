//! Transient user-facing messages.
//!
//! Only one notification is visible at a time. Posting a new one replaces
//! the content and restarts the timer.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Default time a notification stays visible.
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Canceled,
    Info,
}

impl Severity {
    /// Color name carried alongside the message.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Success => "green",
            Severity::Error => "#b80d0d",
            Severity::Canceled => "red",
            Severity::Info => "blue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct NotificationChannel {
    current: Option<Notification>,
    timeout: Duration,
}

impl NotificationChannel {
    pub fn new(timeout: Duration) -> Self {
        Self {
            current: None,
            timeout,
        }
    }

    pub fn post(&mut self, message: impl Into<String>, severity: Severity) {
        self.post_at(message, severity, Instant::now());
    }

    pub fn post_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        self.current = Some(Notification {
            message: message.into(),
            severity,
            expires_at: now + self.timeout,
        });
    }

    /// The notification still visible at `now`, if any.
    pub fn visible(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|notification| now < notification.expires_at)
    }

    /// Drop the notification once its deadline has passed.
    ///
    /// Returns true when something was hidden.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.current.as_ref() {
            Some(notification) if now >= notification.expires_at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}
