//! Ongoing status notification shown while a countdown runs

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utils::format_clock;

pub const NOTIFICATION_TITLE: &str = "Sleep Timer";

/// Actions offered on the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    /// Add the configured increment to the running countdown
    Extend,
    Stop,
}

impl NotificationAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "extend" => Some(Self::Extend),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub action: NotificationAction,
    pub label: String,
}

/// Content of the status notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotification {
    pub title: String,
    pub text: String,
    /// Ongoing notifications cannot be dismissed by the user
    pub ongoing: bool,
    pub actions: Vec<ActionButton>,
}

impl StatusNotification {
    pub fn countdown(remaining_millis: u64, extend_increment_millis: u64) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            text: format_clock(remaining_millis),
            ongoing: true,
            actions: vec![
                ActionButton {
                    action: NotificationAction::Extend,
                    label: format!("+{}s", extend_increment_millis / 1000),
                },
                ActionButton {
                    action: NotificationAction::Stop,
                    label: "Stop".to_string(),
                },
            ],
        }
    }
}

/// Surface that displays the status notification.
pub trait StatusNotifier: Send + Sync {
    fn show(&self, notification: &StatusNotification);

    fn update(&self, notification: &StatusNotification);

    fn cancel(&self);

    /// The notification currently displayed, if any
    fn current(&self) -> Option<StatusNotification>;
}

/// Notifier that logs the notification and keeps it for status queries.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    current: Mutex<Option<StatusNotification>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusNotifier for TracingNotifier {
    fn show(&self, notification: &StatusNotification) {
        info!("Notification shown: {} {}", notification.title, notification.text);
        if let Ok(mut current) = self.current.lock() {
            *current = Some(notification.clone());
        }
    }

    fn update(&self, notification: &StatusNotification) {
        if let Ok(mut current) = self.current.lock() {
            // Ticks arrive far more often than the displayed second changes
            let changed = current
                .as_ref()
                .map_or(true, |shown| shown.text != notification.text);
            if changed {
                debug!("Notification updated: {}", notification.text);
                *current = Some(notification.clone());
            }
        }
    }

    fn cancel(&self) {
        if let Ok(mut current) = self.current.lock() {
            if current.take().is_some() {
                info!("Notification cancelled");
            }
        }
    }

    fn current(&self) -> Option<StatusNotification> {
        self.current.lock().ok().and_then(|current| current.clone())
    }
}
