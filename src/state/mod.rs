//! State management module
//!
//! Countdown state and events, the update broadcast to listeners, the
//! client view projection and the HTTP application state.

pub mod app_state;
pub mod countdown_state;
pub mod timer_state;
pub mod view_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown_state::{CommandOutcome, CountdownEvent, CountdownState, Phase};
pub use timer_state::TimerState;
pub use view_state::{ViewState, ViewStateAdapter};
