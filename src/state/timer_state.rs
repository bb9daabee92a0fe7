//! Countdown update broadcast to listeners

use serde::{Deserialize, Serialize};

/// One countdown update as seen by listeners: the remaining time and
/// whether a countdown is still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_millis: u64,
    #[serde(rename = "is_active")]
    pub active: bool,
}

impl TimerState {
    /// Create an inactive timer state
    pub fn new() -> Self {
        Self::inactive()
    }

    /// Update for a running countdown
    pub fn active(remaining_millis: u64) -> Self {
        Self {
            remaining_millis,
            active: true,
        }
    }

    /// Update sent once when a countdown stops or finishes
    pub fn inactive() -> Self {
        Self {
            remaining_millis: 0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
