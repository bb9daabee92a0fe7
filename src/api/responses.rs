//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::StatusNotification,
    state::{CommandOutcome, CountdownState, ViewState},
};

/// Body of `POST /start`.
///
/// An explicit duration wins over a clock string (`MM:SS` or `HH:MM:SS`),
/// which wins over an hour/minute selection; with none of them the last
/// persisted duration is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    pub duration_millis: Option<i64>,
    pub clock: Option<String>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

/// Body of `POST /extend`. Without a delta the configured increment is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendRequest {
    pub delta_millis: Option<i64>,
}

/// Response to a control command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: CommandOutcome,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub countdown: CountdownState,
}

impl ApiResponse {
    pub fn new(action: &str, status: CommandOutcome, countdown: CountdownState) -> Self {
        let message = match status {
            CommandOutcome::Applied => format!("{} applied", action),
            CommandOutcome::Ignored => format!("{} ignored", action),
        };
        Self {
            status,
            message,
            timestamp: Utc::now(),
            countdown,
        }
    }
}

/// Full daemon status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub countdown: CountdownState,
    pub view: ViewState,
    pub keep_alive: bool,
    pub notification: Option<StatusNotification>,
    pub onboarding_completed: bool,
    pub uptime: String,
    pub port: u16,
    pub address: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
