// Shared fakes for integration tests

#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use futures::future::{BoxFuture, FutureExt};
use sleep_timer::{
    engine::{EngineHost, HostSettings},
    services::{DurationStore, ScreenLock, StatusNotification, StatusNotifier},
    state::TimerState,
};
use tokio::sync::broadcast;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn test_data_dir() -> PathBuf {
    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "sleep_timer_it_{}_{}",
        std::process::id(),
        counter
    ));
    std::fs::remove_dir_all(&dir).ok();
    dir
}

#[derive(Default)]
pub struct RecordingLock {
    authorized: AtomicBool,
    locks: AtomicUsize,
}

impl RecordingLock {
    pub fn authorized() -> Arc<Self> {
        let lock = Self::default();
        lock.authorized.store(true, Ordering::SeqCst);
        Arc::new(lock)
    }

    pub fn unauthorized() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lock_count(&self) -> usize {
        self.locks.load(Ordering::SeqCst)
    }
}

impl ScreenLock for RecordingLock {
    fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    fn lock(&self) -> BoxFuture<'_, Result<(), String>> {
        self.locks.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }.boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Show(String),
    Update(String),
    Cancel,
}

#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    current: Mutex<Option<StatusNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatusNotifier for RecordingNotifier {
    fn show(&self, notification: &StatusNotification) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Show(notification.text.clone()));
        *self.current.lock().unwrap() = Some(notification.clone());
    }

    fn update(&self, notification: &StatusNotification) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Update(notification.text.clone()));
        *self.current.lock().unwrap() = Some(notification.clone());
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(NotifierCall::Cancel);
        *self.current.lock().unwrap() = None;
    }

    fn current(&self) -> Option<StatusNotification> {
        self.current.lock().unwrap().clone()
    }
}

pub struct TestHost {
    pub host: Arc<EngineHost>,
    pub store: Arc<DurationStore>,
    pub lock: Arc<RecordingLock>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn launch(store: DurationStore, lock: Arc<RecordingLock>) -> TestHost {
    let store = Arc::new(store);
    let notifier = RecordingNotifier::new();
    let host = EngineHost::launch(
        HostSettings::default(),
        Arc::clone(&store),
        lock.clone(),
        notifier.clone(),
    );
    TestHost {
        host,
        store,
        lock,
        notifier,
    }
}

/// Receive updates until the first inactive one, inclusive
pub async fn updates_until_inactive(
    updates: &mut broadcast::Receiver<TimerState>,
) -> Vec<TimerState> {
    let mut seen = Vec::new();
    loop {
        match updates.recv().await {
            Ok(update) => {
                seen.push(update);
                if !update.is_active() {
                    return seen;
                }
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return seen,
        }
    }
}
