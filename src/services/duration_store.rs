//! Persistence of the last confirmed countdown duration

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const SETTINGS_FILE: &str = "settings.json";

/// On-disk settings layout. Durations are stored in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub last_duration_millis: u64,
    pub onboarding_completed: bool,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Last user-chosen duration, durable across restarts.
///
/// The file is read once when the store is opened. Storage failures are
/// logged and otherwise swallowed: reads fall back to zero and writes keep
/// the in-memory value.
///
/// `record` only touches memory; `flush` writes the latest settings to disk.
/// Async callers record inline and flush on the blocking pool.
#[derive(Debug)]
pub struct DurationStore {
    path: Option<PathBuf>,
    settings: Mutex<StoredSettings>,
    write_lock: Mutex<()>,
}

impl DurationStore {
    /// Open the settings file inside `data_dir`, creating nothing until the
    /// first write.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(SETTINGS_FILE);
        let settings = match Self::load(&path) {
            Ok(Some(settings)) => {
                info!(
                    "Loaded settings from {:?} (last duration {}ms)",
                    path, settings.last_duration_millis
                );
                settings
            }
            Ok(None) => {
                debug!("No settings at {:?}, using defaults", path);
                StoredSettings::default()
            }
            Err(e) => {
                warn!("Failed to read settings from {:?}: {}", path, e);
                StoredSettings::default()
            }
        };

        Self {
            path: Some(path),
            settings: Mutex::new(settings),
            write_lock: Mutex::new(()),
        }
    }

    /// A store that only lives as long as the process.
    pub fn open_in_memory() -> Self {
        Self {
            path: None,
            settings: Mutex::new(StoredSettings::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Platform data directory for the daemon, if one can be determined.
    pub fn default_data_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "sleeptimer", "sleep-timer")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Last confirmed duration in milliseconds, 0 if never set.
    pub fn get(&self) -> u64 {
        self.settings
            .lock()
            .map(|settings| settings.last_duration_millis)
            .unwrap_or(0)
    }

    /// Record and persist a duration.
    pub fn set(&self, duration_millis: u64) {
        self.record(duration_millis);
        self.flush();
    }

    /// Record a duration in memory without writing it out.
    pub fn record(&self, duration_millis: u64) {
        self.update(|settings| settings.last_duration_millis = duration_millis);
    }

    pub fn onboarding_completed(&self) -> bool {
        self.settings
            .lock()
            .map(|settings| settings.onboarding_completed)
            .unwrap_or(false)
    }

    pub fn set_onboarding_completed(&self, completed: bool) {
        self.update(|settings| settings.onboarding_completed = completed);
        self.flush();
    }

    /// Write the current settings to disk. Blocking.
    ///
    /// Writers are serialized and each one writes the latest settings, so
    /// the file ends up with the last recorded values whatever order
    /// concurrent flushes run in.
    pub fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("Failed to lock settings file: {}", e);
                return;
            }
        };
        let snapshot = match self.settings.lock() {
            Ok(settings) => settings.clone(),
            Err(e) => {
                warn!("Failed to lock settings: {}", e);
                return;
            }
        };

        if let Err(e) = Self::persist(path, &snapshot) {
            warn!("Failed to persist settings to {:?}: {}", path, e);
        }
    }

    fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut StoredSettings),
    {
        match self.settings.lock() {
            Ok(mut settings) => updater(&mut settings),
            Err(e) => warn!("Failed to lock settings: {}", e),
        }
    }

    fn load(path: &Path) -> Result<Option<StoredSettings>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn persist(path: &Path, settings: &StoredSettings) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!("Settings written to {:?}", path);
        Ok(())
    }
}
