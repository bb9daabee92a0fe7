//! Sleep Timer - countdown daemon that locks the screen at zero
//!
//! A single countdown engine runs in the background, independent of any
//! attached client. Clients control it over HTTP and follow its progress
//! through a server-sent event stream; when the countdown reaches zero the
//! screen is locked, if locking is authorized.

pub mod api;
pub mod config;
pub mod engine;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{EngineHost, HostSettings};
pub use state::{AppState, CountdownEvent, CountdownState, TimerState};
pub use utils::signals::shutdown_signal;
