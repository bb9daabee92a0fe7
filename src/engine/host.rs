//! Engine host
//!
//! Keeps the countdown engine alive independently of any client and turns
//! its events into effects: the status notification, the update broadcast,
//! the persisted duration and, at zero, the screen lock.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{info, warn};

use super::countdown::{CountdownEngine, EngineHandle, DEFAULT_TICK_PERIOD};
use crate::{
    services::{DurationStore, NotificationAction, ScreenLock, StatusNotification, StatusNotifier},
    state::{CommandOutcome, CountdownState, TimerState},
    tasks::event_relay_task,
};

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Default amount added by the notification's extend action
pub const DEFAULT_EXTEND_INCREMENT_MILLIS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct HostSettings {
    pub tick_period: Duration,
    pub extend_increment_millis: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            extend_increment_millis: DEFAULT_EXTEND_INCREMENT_MILLIS,
        }
    }
}

/// State shared between the host and its event relay task.
///
/// Only the relay writes the notification, the broadcast and the latest
/// update, always right after handling the engine event that caused it.
pub struct HostContext {
    pub store: Arc<DurationStore>,
    pub lock: Arc<dyn ScreenLock>,
    pub notifier: Arc<dyn StatusNotifier>,
    pub extend_increment_millis: u64,
    updates_tx: broadcast::Sender<TimerState>,
    latest_tx: watch::Sender<TimerState>,
    keep_alive: AtomicBool,
}

impl HostContext {
    /// Send an update to every listener and remember it as the latest
    pub fn publish(&self, update: TimerState) {
        self.latest_tx.send_replace(update);
        // No subscribers is normal when no client is attached
        let _ = self.updates_tx.send(update);
    }

    pub fn enter_keep_alive(&self, session: u64) {
        if !self.keep_alive.swap(true, Ordering::SeqCst) {
            info!("Entering keep-alive mode for session {}", session);
        }
    }

    pub fn exit_keep_alive(&self, session: u64) {
        if self.keep_alive.swap(false, Ordering::SeqCst) {
            info!("Leaving keep-alive mode after session {}", session);
        }
    }

    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive.load(Ordering::SeqCst)
    }

    pub fn notification(&self, remaining_millis: u64) -> StatusNotification {
        StatusNotification::countdown(remaining_millis, self.extend_increment_millis)
    }
}

/// The single countdown host of the process.
///
/// Construct it once with [`EngineHost::launch`] and share the returned
/// `Arc` with every consumer.
pub struct EngineHost {
    engine: EngineHandle,
    context: Arc<HostContext>,
    tasks: Mutex<Option<(JoinHandle<()>, JoinHandle<()>)>>,
}

impl EngineHost {
    /// Spawn the engine and its event relay. Must be called inside a tokio
    /// runtime.
    pub fn launch(
        settings: HostSettings,
        store: Arc<DurationStore>,
        lock: Arc<dyn ScreenLock>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Arc<Self> {
        let (engine, handle, events) = CountdownEngine::new(settings.tick_period);
        let (updates_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let (latest_tx, _) = watch::channel(TimerState::inactive());

        let context = Arc::new(HostContext {
            store,
            lock,
            notifier,
            extend_increment_millis: settings.extend_increment_millis,
            updates_tx,
            latest_tx,
            keep_alive: AtomicBool::new(false),
        });

        let engine_task = engine.spawn();
        let relay_task = tokio::spawn(event_relay_task(events, Arc::clone(&context)));
        info!("Engine host launched");

        Arc::new(Self {
            engine: handle,
            context,
            tasks: Mutex::new(Some((engine_task, relay_task))),
        })
    }

    /// Start a countdown, replacing any countdown in progress. The duration
    /// is persisted once the engine accepts it.
    pub async fn start(&self, duration_millis: u64) -> CommandOutcome {
        self.engine.start(duration_millis).await
    }

    /// Start again with the last persisted duration
    pub async fn start_last(&self) -> CommandOutcome {
        self.start(self.context.store.get()).await
    }

    pub async fn stop(&self) -> CommandOutcome {
        self.engine.stop().await
    }

    pub async fn extend(&self, delta_millis: u64) -> CommandOutcome {
        self.engine.extend(delta_millis).await
    }

    /// Dispatch an action pressed on the status notification
    pub async fn handle_action(&self, action: NotificationAction) -> CommandOutcome {
        match action {
            NotificationAction::Extend => self.extend(self.context.extend_increment_millis).await,
            NotificationAction::Stop => self.stop().await,
        }
    }

    pub async fn snapshot(&self) -> CountdownState {
        self.engine.snapshot().await
    }

    /// Stream of countdown updates, starting with the next one
    pub fn subscribe(&self) -> broadcast::Receiver<TimerState> {
        self.context.updates_tx.subscribe()
    }

    /// Most recent update
    pub fn latest(&self) -> TimerState {
        *self.context.latest_tx.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.context.latest_tx.subscribe()
    }

    pub fn is_keep_alive(&self) -> bool {
        self.context.is_keep_alive()
    }

    pub fn current_notification(&self) -> Option<StatusNotification> {
        self.context.notifier.current()
    }

    pub fn is_lock_authorized(&self) -> bool {
        self.context.lock.is_authorized()
    }

    pub fn store(&self) -> &Arc<DurationStore> {
        &self.context.store
    }

    pub fn extend_increment_millis(&self) -> u64 {
        self.context.extend_increment_millis
    }

    /// Tear the host down: cancel the tick loop, let the relay apply the
    /// remaining events, then make sure no notification is left behind.
    pub async fn shutdown(&self) {
        info!("Shutting down engine host");
        self.engine.shutdown().await;

        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => tasks.take(),
            Err(e) => {
                warn!("Failed to lock host tasks: {}", e);
                None
            }
        };
        if let Some((engine_task, relay_task)) = tasks {
            if let Err(e) = engine_task.await {
                warn!("Countdown engine task failed: {}", e);
            }
            if let Err(e) = relay_task.await {
                warn!("Event relay task failed: {}", e);
            }
        }

        self.context.notifier.cancel();
        self.context.keep_alive.store(false, Ordering::SeqCst);
        info!("Engine host shut down");
    }
}
