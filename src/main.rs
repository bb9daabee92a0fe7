//! Sleep Timer - countdown daemon that locks the screen at zero
//!
//! This is the main entry point for the sleep-timer daemon.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};

use sleep_timer::{
    api::create_router,
    config::Config,
    engine::EngineHost,
    services::{CommandScreenLock, DurationStore, TracingNotifier},
    state::{AppState, ViewState, ViewStateAdapter},
    tasks::view_state_sync_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("sleep_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting sleep-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, extend={}ms",
        config.host, config.port, config.tick_ms, config.extend_ms
    );

    let store = Arc::new(match config.resolved_data_dir() {
        Some(dir) => DurationStore::open(dir),
        None => {
            warn!("No data directory available, durations will not persist");
            DurationStore::open_in_memory()
        }
    });

    // Without an available lock command the countdown still runs, it just
    // ends without locking
    let lock = Arc::new(CommandScreenLock::from_command_line(&config.lock_command));
    match lock.command_line() {
        Some(line) => info!("Screen lock command: {}", line),
        None => info!("Screen lock command: none"),
    }
    if config.grant_lock {
        lock.grant();
    } else {
        lock.probe();
    }

    let host = EngineHost::launch(
        config.host_settings(),
        Arc::clone(&store),
        lock.clone(),
        Arc::new(TracingNotifier::new()),
    );

    // Keep the client view state in sync with the host
    let adapter = ViewStateAdapter::new(store, lock);
    let (view_tx, view_rx) = watch::channel(ViewState::default());
    tokio::spawn(view_state_sync_task(adapter, host.subscribe(), view_tx));

    let state = Arc::new(AppState::new(
        Arc::clone(&host),
        view_rx,
        config.port,
        config.address(),
    ));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start          - Start a countdown (duration_millis or hour/minute)");
    info!("  POST /stop           - Cancel the countdown");
    info!("  POST /extend         - Add time to the countdown");
    info!("  POST /action/:action - Notification actions (extend, stop)");
    info!("  POST /onboarding     - Mark onboarding as completed");
    info!("  GET  /status         - Countdown and daemon status");
    info!("  GET  /events         - Server-sent countdown updates");
    info!("  GET  /health         - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    host.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
