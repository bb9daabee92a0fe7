//! Utility functions module
//!
//! Signal handling and the pure time conversions shared by the engine,
//! the notification and the view state.

pub mod signals;
pub mod time_codec;

// Re-export main functions
pub use signals::shutdown_signal;
pub use time_codec::{format_clock, from_millis, parse_clock, to_millis};
