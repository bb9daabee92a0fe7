//! HTTP endpoint handlers
//!
//! Invalid input is never an HTTP error: the command is reported as
//! ignored and the countdown is left untouched.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::responses::{ApiResponse, ExtendRequest, HealthResponse, StartRequest, StatusResponse};
use crate::{
    services::NotificationAction,
    state::{AppState, CommandOutcome},
    utils::{parse_clock, to_millis},
};

/// Read an optional JSON body. A request without a JSON body yields the
/// default request; a malformed one yields `None`.
fn optional_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Option<T> {
    match body {
        Ok(Json(request)) => Some(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Some(T::default()),
        Err(e) => {
            debug!("Rejected request body: {}", e);
            None
        }
    }
}

async fn respond(state: &AppState, action: &str, outcome: CommandOutcome) -> Json<ApiResponse> {
    if outcome.is_applied() {
        info!("{} command applied", action);
        state.record_action(action);
    } else {
        debug!("{} command ignored", action);
    }
    Json(ApiResponse::new(action, outcome, state.host.snapshot().await))
}

/// Handle POST /start - Start or restart the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Json<ApiResponse> {
    let outcome = match optional_body(body) {
        Some(StartRequest {
            duration_millis: Some(millis),
            ..
        }) => match u64::try_from(millis) {
            Ok(millis) => state.host.start(millis).await,
            Err(_) => CommandOutcome::Ignored,
        },
        Some(StartRequest {
            clock: Some(clock),
            ..
        }) => state.host.start(parse_clock(&clock)).await,
        Some(StartRequest {
            hour: None,
            minute: None,
            ..
        }) => state.host.start_last().await,
        Some(StartRequest { hour, minute, .. }) => {
            let millis = to_millis(hour.unwrap_or(0), minute.unwrap_or(0));
            state.host.start(millis).await
        }
        None => CommandOutcome::Ignored,
    };
    respond(&state, "start", outcome).await
}

/// Handle POST /stop - Cancel the countdown without locking
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let outcome = state.host.stop().await;
    respond(&state, "stop", outcome).await
}

/// Handle POST /extend - Add time to the running countdown
pub async fn extend_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ExtendRequest>, JsonRejection>,
) -> Json<ApiResponse> {
    let outcome = match optional_body(body) {
        Some(ExtendRequest {
            delta_millis: Some(delta),
        }) => match u64::try_from(delta) {
            Ok(delta) => state.host.extend(delta).await,
            Err(_) => CommandOutcome::Ignored,
        },
        Some(ExtendRequest { delta_millis: None }) => {
            state
                .host
                .extend(state.host.extend_increment_millis())
                .await
        }
        None => CommandOutcome::Ignored,
    };
    respond(&state, "extend", outcome).await
}

/// Handle POST /action/:action - Buttons of the status notification
pub async fn action_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let Some(parsed) = NotificationAction::from_name(&action) else {
        debug!("Unknown notification action: {}", action);
        return Err(StatusCode::NOT_FOUND);
    };
    let outcome = state.host.handle_action(parsed).await;
    Ok(respond(&state, &action, outcome).await)
}

/// Handle POST /onboarding - Record that onboarding was completed
pub async fn onboarding_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let store = Arc::clone(state.host.store());
    let write = tokio::task::spawn_blocking(move || store.set_onboarding_completed(true));
    let outcome = match write.await {
        Ok(()) => CommandOutcome::Applied,
        Err(e) => {
            warn!("Failed to record onboarding: {}", e);
            CommandOutcome::Ignored
        }
    };
    respond(&state, "onboarding", outcome).await
}

/// Handle GET /status - Return countdown and daemon status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        countdown: state.host.snapshot().await,
        view: state.get_view_state(),
        keep_alive: state.host.is_keep_alive(),
        notification: state.host.current_notification(),
        onboarding_completed: state.host.store().onboarding_completed(),
        uptime: state.get_uptime(),
        port: state.port,
        address: state.address.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Server-sent stream of countdown updates.
///
/// The stream opens with the latest update, then follows every update the
/// host publishes. A slow client skips updates instead of stalling others.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let updates = state.host.subscribe();
    let latest = state.host.latest();

    let follow = stream::unfold(updates, |mut updates| async move {
        loop {
            match updates.recv().await {
                Ok(update) => return Some((Event::default().json_data(update), updates)),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Event stream client skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let stream = stream::once(async move { Event::default().json_data(latest) }).chain(follow);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
