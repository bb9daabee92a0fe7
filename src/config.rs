//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::engine::HostSettings;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "sleep-timer")]
#[command(about = "A countdown daemon that locks the screen when time runs out")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Countdown tick period in milliseconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Time added by the notification's extend action, in milliseconds
    #[arg(long, default_value = "5000", value_parser = clap::value_parser!(u64).range(1..))]
    pub extend_ms: u64,

    /// Directory for the persisted settings (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Command that locks the screen; empty disables locking
    #[arg(long, default_value = "loginctl lock-session")]
    pub lock_command: String,

    /// Authorize screen locking without looking the lock program up
    #[arg(long)]
    pub grant_lock: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            tick_period: Duration::from_millis(self.tick_ms),
            extend_increment_millis: self.extend_ms,
        }
    }

    /// Settings directory: the explicit one, else the platform default
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(crate::services::DurationStore::default_data_dir)
    }
}
