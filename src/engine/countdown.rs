//! Countdown engine
//!
//! The engine runs as a single task that owns the countdown state. Control
//! commands are queued to it through an [`EngineHandle`] and applied one at a
//! time, interleaved with ticks, so nothing else ever writes the state and no
//! two tick loops can exist. Events leave through an ordered channel.

use std::time::Duration;

use chrono::Utc;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{interval, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::state::{CommandOutcome, CountdownEvent, CountdownState, Phase};

/// Tick cadence used unless configured otherwise
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(10);

const COMMAND_QUEUE_CAPACITY: usize = 64;

enum EngineCommand {
    Start {
        duration_millis: u64,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Stop {
        reply: oneshot::Sender<CommandOutcome>,
    },
    Extend {
        delta_millis: u64,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<CountdownState>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// A running countdown.
///
/// Remaining time is derived from the clock, never from the tick count:
/// `remaining = remaining_at_anchor - (now - anchor)`.
struct Session {
    id: u64,
    total_millis: u64,
    remaining_at_anchor: u64,
    anchor: Instant,
    started_at_epoch_millis: i64,
    last_reported: u64,
}

impl Session {
    fn remaining(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.anchor).as_millis();
        self.remaining_at_anchor
            .saturating_sub(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }
}

/// Command entry point of the engine. Cheap to clone.
///
/// Calls never fail: if the engine is gone every command is ignored.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Begin a countdown, replacing any countdown in progress.
    pub async fn start(&self, duration_millis: u64) -> CommandOutcome {
        self.request(|reply| EngineCommand::Start {
            duration_millis,
            reply,
        })
        .await
    }

    pub async fn stop(&self) -> CommandOutcome {
        self.request(|reply| EngineCommand::Stop { reply }).await
    }

    /// Add time to the running countdown.
    pub async fn extend(&self, delta_millis: u64) -> CommandOutcome {
        self.request(|reply| EngineCommand::Extend {
            delta_millis,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> CountdownState {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(EngineCommand::Snapshot { reply })
            .await
            .is_err()
        {
            return CountdownState::idle();
        }
        response.await.unwrap_or_default()
    }

    /// Cancel any countdown and stop the engine task.
    pub async fn shutdown(&self) {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(EngineCommand::Shutdown { reply })
            .await
            .is_ok()
        {
            let _ = response.await;
        }
    }

    async fn request<F>(&self, build: F) -> CommandOutcome
    where
        F: FnOnce(oneshot::Sender<CommandOutcome>) -> EngineCommand,
    {
        let (reply, response) = oneshot::channel();
        if self.commands.send(build(reply)).await.is_err() {
            warn!("Countdown engine is not running, command ignored");
            return CommandOutcome::Ignored;
        }
        response.await.unwrap_or(CommandOutcome::Ignored)
    }
}

pub struct CountdownEngine {
    commands: mpsc::Receiver<EngineCommand>,
    events: mpsc::UnboundedSender<CountdownEvent>,
    tick_period: Duration,
    session: Option<Session>,
    last_session: u64,
}

impl CountdownEngine {
    /// Create an idle engine together with its command handle and the
    /// receiving end of its event stream.
    pub fn new(
        tick_period: Duration,
    ) -> (Self, EngineHandle, mpsc::UnboundedReceiver<CountdownEvent>) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (events, events_rx) = mpsc::unbounded_channel();

        let engine = Self {
            commands,
            events,
            tick_period,
            session: None,
            last_session: 0,
        };
        (engine, EngineHandle { commands: commands_tx }, events_rx)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(
            "Starting countdown engine (tick every {}ms)",
            self.tick_period.as_millis()
        );

        let mut ticker = interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(EngineCommand::Shutdown { reply }) => {
                        self.cancel("engine shutdown");
                        let _ = reply.send(());
                        break;
                    }
                    Some(command) => self.handle(command, &mut ticker),
                    None => {
                        self.cancel("all handles dropped");
                        break;
                    }
                },

                _ = ticker.tick(), if self.session.is_some() => {
                    self.on_tick(Instant::now());
                }
            }
        }

        info!("Countdown engine stopped");
    }

    fn handle(&mut self, command: EngineCommand, ticker: &mut Interval) {
        let now = Instant::now();
        match command {
            EngineCommand::Start {
                duration_millis,
                reply,
            } => {
                let outcome = self.start(duration_millis, now);
                if outcome.is_applied() {
                    ticker.reset();
                }
                let _ = reply.send(outcome);
            }
            EngineCommand::Stop { reply } => {
                let outcome = if self.cancel("stop requested") {
                    CommandOutcome::Applied
                } else {
                    debug!("Stop ignored, no countdown running");
                    CommandOutcome::Ignored
                };
                let _ = reply.send(outcome);
            }
            EngineCommand::Extend {
                delta_millis,
                reply,
            } => {
                let outcome = self.extend(delta_millis, now);
                if outcome.is_applied() {
                    ticker.reset();
                }
                let _ = reply.send(outcome);
            }
            EngineCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot(now));
            }
            EngineCommand::Shutdown { reply } => {
                // Handled in the run loop
                let _ = reply.send(());
            }
        }
    }

    fn start(&mut self, duration_millis: u64, now: Instant) -> CommandOutcome {
        if duration_millis == 0 {
            debug!("Start ignored, duration must be positive");
            return CommandOutcome::Ignored;
        }

        if let Some(previous) = self.session.take() {
            info!(
                "Replacing countdown session {} ({}ms left)",
                previous.id,
                previous.remaining(now)
            );
        }

        self.last_session += 1;
        let id = self.last_session;
        self.session = Some(Session {
            id,
            total_millis: duration_millis,
            remaining_at_anchor: duration_millis,
            anchor: now,
            started_at_epoch_millis: Utc::now().timestamp_millis(),
            last_reported: duration_millis,
        });

        info!("Countdown session {} started for {}ms", id, duration_millis);
        self.emit(CountdownEvent::Started {
            session: id,
            total_millis: duration_millis,
        });
        self.emit(CountdownEvent::Tick {
            session: id,
            remaining_millis: duration_millis,
        });
        CommandOutcome::Applied
    }

    fn extend(&mut self, delta_millis: u64, now: Instant) -> CommandOutcome {
        if delta_millis == 0 {
            debug!("Extend ignored, delta must be positive");
            return CommandOutcome::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            debug!("Extend ignored, no countdown running");
            return CommandOutcome::Ignored;
        };

        let remaining = session.remaining(now).saturating_add(delta_millis);
        session.total_millis = session.total_millis.saturating_add(delta_millis);
        session.remaining_at_anchor = remaining;
        session.anchor = now;
        session.last_reported = remaining;
        let id = session.id;

        info!(
            "Countdown session {} extended by {}ms ({}ms left)",
            id, delta_millis, remaining
        );
        self.emit(CountdownEvent::Tick {
            session: id,
            remaining_millis: remaining,
        });
        CommandOutcome::Applied
    }

    /// Drop the running session, if any. Returns whether one was running.
    fn cancel(&mut self, reason: &str) -> bool {
        match self.session.take() {
            Some(session) => {
                info!("Countdown session {} cancelled: {}", session.id, reason);
                self.emit(CountdownEvent::Stopped { session: session.id });
                true
            }
            None => false,
        }
    }

    fn on_tick(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let id = session.id;
        let remaining = session.remaining(now);

        if remaining == 0 {
            self.finish(id);
        } else if remaining < session.last_reported {
            session.last_reported = remaining;
            self.emit(CountdownEvent::Tick {
                session: id,
                remaining_millis: remaining,
            });
        }
    }

    fn finish(&mut self, id: u64) {
        self.session = None;
        debug!("Countdown session {} entered {:?}", id, Phase::Finished);
        self.emit(CountdownEvent::Tick {
            session: id,
            remaining_millis: 0,
        });
        self.emit(CountdownEvent::Finished { session: id });
        info!("Countdown session {} finished", id);
    }

    fn snapshot(&self, now: Instant) -> CountdownState {
        match &self.session {
            Some(session) => CountdownState {
                phase: Phase::Running,
                session: session.id,
                total_duration_millis: session.total_millis,
                remaining_millis: session.remaining(now).min(session.total_millis),
                started_at_epoch_millis: Some(session.started_at_epoch_millis),
            },
            None => CountdownState {
                session: self.last_session,
                ..CountdownState::idle()
            },
        }
    }

    fn emit(&self, event: CountdownEvent) {
        if self.events.send(event).is_err() {
            debug!("No listener for countdown event {:?}", event);
        }
    }
}
