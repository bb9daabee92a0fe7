//! Background tasks module
//!
//! Tasks that run alongside the engine and the HTTP server.

pub mod event_relay;
pub mod view_state_sync;

// Re-export main functions
pub use event_relay::event_relay_task;
pub use view_state_sync::view_state_sync_task;
