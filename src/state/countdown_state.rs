//! Authoritative countdown state owned by the engine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No countdown in progress
    Idle,
    /// Actively ticking
    Running,
    /// Reached zero. Held only within the engine step that emits `Tick(0)`
    /// and `Finished`, after which the engine is `Idle` again; snapshots
    /// never report it.
    Finished,
}

/// Snapshot of the countdown.
///
/// `remaining_millis` is always within `0..=total_duration_millis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub phase: Phase,
    /// Running session number, 0 before the first start
    pub session: u64,
    pub total_duration_millis: u64,
    pub remaining_millis: u64,
    pub started_at_epoch_millis: Option<i64>,
}

impl CountdownState {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            session: 0,
            total_duration_millis: 0,
            remaining_millis: 0,
            started_at_epoch_millis: None,
        }
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Event emitted by the engine, tagged with the session it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CountdownEvent {
    /// A new session began with the given duration
    Started { session: u64, total_millis: u64 },
    Tick { session: u64, remaining_millis: u64 },
    /// Terminal event; always the last event of its session
    Finished { session: u64 },
    /// The session was cancelled before reaching zero
    Stopped { session: u64 },
}

impl CountdownEvent {
    pub fn session(&self) -> u64 {
        match *self {
            CountdownEvent::Started { session, .. }
            | CountdownEvent::Tick { session, .. }
            | CountdownEvent::Finished { session }
            | CountdownEvent::Stopped { session } => session,
        }
    }
}

/// Result of a control command. Invalid input is ignored, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Applied,
    Ignored,
}

impl CommandOutcome {
    pub fn is_applied(self) -> bool {
        self == CommandOutcome::Applied
    }
}
