//! Event relay background task

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    engine::HostContext,
    state::{CountdownEvent, TimerState},
};

/// Background task that applies the host's effects for every engine event,
/// in the order the engine produced them. Ends when the engine stops.
pub async fn event_relay_task(
    mut events: mpsc::UnboundedReceiver<CountdownEvent>,
    context: Arc<HostContext>,
) {
    info!("Starting event relay task");

    let mut last_locked_session = None;
    let mut pending_write: Option<JoinHandle<()>> = None;

    while let Some(event) = events.recv().await {
        match event {
            CountdownEvent::Started {
                session,
                total_millis,
            } => {
                debug!("Session {} started, persisting {}ms", session, total_millis);
                context.store.record(total_millis);
                let store = Arc::clone(&context.store);
                pending_write = Some(tokio::task::spawn_blocking(move || store.flush()));
                context.enter_keep_alive(session);
                context.notifier.show(&context.notification(total_millis));
            }

            CountdownEvent::Tick {
                remaining_millis, ..
            } => {
                context.notifier.update(&context.notification(remaining_millis));
                context.publish(TimerState::active(remaining_millis));
            }

            CountdownEvent::Finished { session } => {
                info!("Session {} finished", session);
                context.publish(TimerState::inactive());

                if last_locked_session != Some(session) {
                    last_locked_session = Some(session);
                    if context.lock.is_authorized() {
                        if let Err(e) = context.lock.lock().await {
                            warn!("Failed to lock screen: {}", e);
                        }
                    } else {
                        info!("Screen lock not authorized, skipping");
                    }
                }

                context.notifier.cancel();
                context.exit_keep_alive(session);
            }

            CountdownEvent::Stopped { session } => {
                info!("Session {} stopped", session);
                context.publish(TimerState::inactive());
                context.notifier.cancel();
                context.exit_keep_alive(session);
            }
        }
    }

    // Each flush writes the latest settings, so the last one is enough
    if let Some(write) = pending_write {
        if let Err(e) = write.await {
            warn!("Settings write failed: {}", e);
        }
    }

    info!("Event relay stopped");
}
