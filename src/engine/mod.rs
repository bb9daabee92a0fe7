//! Countdown engine and its host
//!
//! The engine owns the countdown state machine; the host keeps it running
//! in the background and applies the effects of its events.

pub mod countdown;
pub mod host;

// Re-export main types
pub use countdown::{CountdownEngine, EngineHandle, DEFAULT_TICK_PERIOD};
pub use host::{EngineHost, HostContext, HostSettings, DEFAULT_EXTEND_INCREMENT_MILLIS};
