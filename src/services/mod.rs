//! Platform services module
//!
//! The collaborators the host acts through: duration persistence, the
//! screen lock and the status notification.

pub mod duration_store;
pub mod notifier;
pub mod screen_lock;

// Re-export main types
pub use duration_store::{DurationStore, StoreError, StoredSettings};
pub use notifier::{
    ActionButton, NotificationAction, StatusNotification, StatusNotifier, TracingNotifier,
};
pub use screen_lock::{CommandScreenLock, ScreenLock};
