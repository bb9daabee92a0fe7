//! Shared state of the HTTP surface

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::ViewState;
use crate::engine::EngineHost;

/// State handed to every HTTP handler
pub struct AppState {
    /// The process-wide countdown host
    pub host: Arc<EngineHost>,
    /// Latest projection maintained by the view state sync task
    pub view_state: watch::Receiver<ViewState>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub address: String,
    /// Last applied command
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        host: Arc<EngineHost>,
        view_state: watch::Receiver<ViewState>,
        port: u16,
        address: String,
    ) -> Self {
        Self {
            host,
            view_state,
            start_time: Instant::now(),
            port,
            address,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Remember a command that changed the countdown
    pub fn record_action(&self, action: &str) {
        debug!("Recording action: {}", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    pub fn get_view_state(&self) -> ViewState {
        self.view_state.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
