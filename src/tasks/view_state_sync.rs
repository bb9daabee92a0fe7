//! View state sync background task

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::state::{TimerState, ViewState, ViewStateAdapter};

/// Background task that projects countdown updates into the view state
/// published on `view_tx`. Runs until the host's broadcast closes.
pub async fn view_state_sync_task(
    mut adapter: ViewStateAdapter,
    mut updates: broadcast::Receiver<TimerState>,
    view_tx: watch::Sender<ViewState>,
) {
    info!("Starting view state sync task");
    view_tx.send_replace(adapter.state().clone());

    loop {
        match updates.recv().await {
            Ok(update) => {
                adapter.apply(update);
                view_tx.send_if_modified(|current| {
                    if current == adapter.state() {
                        false
                    } else {
                        *current = adapter.state().clone();
                        true
                    }
                });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("View state sync skipped {} updates", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    info!("View state sync stopped");
}
