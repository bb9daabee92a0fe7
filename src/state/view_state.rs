//! Client-facing projection of the countdown

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::TimerState;
use crate::{
    services::{DurationStore, ScreenLock},
    utils::{format_clock, from_millis},
};

/// What a client screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub display_time: String,
    /// Picker position, taken from the last confirmed duration
    pub selected_hour: u32,
    pub selected_minute: u32,
    pub is_countdown_active: bool,
    pub is_lock_authorized: bool,
    pub last_duration_millis: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            display_time: format_clock(0),
            selected_hour: 0,
            selected_minute: 0,
            is_countdown_active: false,
            is_lock_authorized: false,
            last_duration_millis: 0,
        }
    }
}

/// Folds countdown updates and the persisted duration into a [`ViewState`].
pub struct ViewStateAdapter {
    store: Arc<DurationStore>,
    lock: Arc<dyn ScreenLock>,
    state: ViewState,
}

impl ViewStateAdapter {
    pub fn new(store: Arc<DurationStore>, lock: Arc<dyn ScreenLock>) -> Self {
        let mut adapter = Self {
            store,
            lock,
            state: ViewState::default(),
        };
        adapter.reset_to_last_duration();
        adapter
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn apply(&mut self, update: TimerState) {
        self.state.is_lock_authorized = self.lock.is_authorized();
        if update.is_active() {
            self.state.is_countdown_active = true;
            self.state.display_time = format_clock(update.remaining_millis);
        } else {
            self.state.is_countdown_active = false;
            self.reset_to_last_duration();
        }
    }

    /// Show the persisted duration again, as on a fresh launch
    fn reset_to_last_duration(&mut self) {
        let last = self.store.get();
        let (hour, minute) = from_millis(last);
        self.state.last_duration_millis = last;
        self.state.selected_hour = hour;
        self.state.selected_minute = minute;
        self.state.display_time = format_clock(last);
        self.state.is_lock_authorized = self.lock.is_authorized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CommandScreenLock;

    fn adapter_with_last(last: u64) -> ViewStateAdapter {
        let store = Arc::new(DurationStore::open_in_memory());
        store.set(last);
        let lock = Arc::new(CommandScreenLock::from_command_line(""));
        ViewStateAdapter::new(store, lock)
    }

    #[test]
    fn starts_from_last_duration() {
        let adapter = adapter_with_last(5_400_000);
        let state = adapter.state();
        assert_eq!(state.display_time, "01:30:00");
        assert_eq!((state.selected_hour, state.selected_minute), (1, 30));
        assert!(!state.is_countdown_active);
        assert!(!state.is_lock_authorized);
    }

    #[test]
    fn active_updates_show_remaining_time() {
        let mut adapter = adapter_with_last(60_000);
        adapter.apply(TimerState::active(3_661_000));
        assert_eq!(adapter.state().display_time, "01:01:01");
        assert!(adapter.state().is_countdown_active);
        // Selection is untouched while counting down
        assert_eq!(adapter.state().selected_minute, 1);
    }

    #[test]
    fn inactive_update_resets_to_persisted_duration() {
        let mut adapter = adapter_with_last(60_000);
        adapter.apply(TimerState::active(1_000));
        adapter.store.set(120_000);
        adapter.apply(TimerState::inactive());

        let state = adapter.state();
        assert!(!state.is_countdown_active);
        assert_eq!(state.display_time, "00:02:00");
        assert_eq!(state.last_duration_millis, 120_000);
    }
}
