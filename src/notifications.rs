//! System notifications and chimes for timer events.

use crate::models::{CycleProgress, TimerConfiguration, TimerMode};
use notify_rust::Notification;
use std::io::{self, Write};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to dispatch notification: {0}")]
    Spawn(#[from] io::Error),
    #[error("Notifications unavailable: {0}")]
    Unavailable(String),
}

/// A user-visible alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    /// Builds the alert announcing a switch into `next`. Alerts are silent;
    /// the completion sound belongs to [`Notifier::chime`].
    pub fn for_transition(
        next: TimerMode,
        progress: &CycleProgress,
        config: &TimerConfiguration,
    ) -> Self {
        let (title, body) = match next {
            TimerMode::ShortBreak => {
                let count = progress.completed_cycles_today;
                let body = if count == 1 {
                    "Great work! You've completed 1 pomodoro today.\nTime for a break.".to_string()
                } else {
                    format!(
                        "Great work! You've completed {} pomodoros today.\nTime for a break.",
                        count
                    )
                };
                ("Pomodoro Complete! 🍅".to_string(), body)
            }
            TimerMode::LongBreak => (
                "Long Break Time! 🎉".to_string(),
                format!(
                    "You've earned a {} minute break. Great job staying focused!",
                    config.long_break_minutes
                ),
            ),
            TimerMode::Work => (
                "Break Over! ☕".to_string(),
                "Ready to start another pomodoro?".to_string(),
            ),
        };

        Self { title, body }
    }
}

/// Best-effort sink for chimes and alerts.
pub trait Notifier {
    /// Plays the completion chime.
    fn chime(&self);
    /// Posts a user-visible alert.
    fn post(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Shows an alert through the desktop notification service.
/// Runs in a background thread to avoid blocking.
pub fn show(alert: &Alert) -> Result<(), NotifyError> {
    let alert = alert.clone();
    thread::Builder::new()
        .name("notification".into())
        .spawn(move || {
            if let Err(e) = build_notification(&alert).show() {
                tracing::warn!(error = %e, title = %alert.title, "failed to show notification");
            }
        })?;
    Ok(())
}

fn build_notification(alert: &Alert) -> Notification {
    let mut notification = Notification::new();
    notification.summary(&alert.title).body(&alert.body);
    notification
}

/// Desktop notifications plus a terminal bell for the chime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn chime(&self) {
        let mut stderr = io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            tracing::debug!(error = %e, "failed to ring terminal bell");
        }
    }

    fn post(&self, alert: &Alert) -> Result<(), NotifyError> {
        show(alert)
    }
}
