//! Training session handle.
//!
//! Owns the [`SessionEngine`] and the [`TickDriver`], and keeps the two in
//! step: the driver runs exactly while the engine is `Running`. Readers get
//! immutable snapshots through a watch channel and events through a
//! broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info};

use super::driver::{TickDriver, TickFlow};
use super::engine::{Command, RunMode, SessionEngine, SessionState};
use super::projection::Projection;
use super::sequence::IntervalSequence;
use crate::events::Event;

/// Tunables for a [`TrainingSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    pub event_buffer: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            event_buffer: 64,
        }
    }
}

struct Shared {
    engine: Mutex<SessionEngine>,
    state_tx: watch::Sender<SessionState>,
    events_tx: broadcast::Sender<Event>,
}

impl Shared {
    /// Apply one command and publish its effects before the engine lock is
    /// released, so readers never observe a half-applied transition.
    async fn apply(&self, command: Command) -> (Vec<Event>, RunMode) {
        let mut engine = self.engine.lock().await;
        let events = engine.apply(command);
        self.publish(&engine, &events);
        (events, engine.run_mode())
    }

    async fn tick(&self) -> TickFlow {
        let mut engine = self.engine.lock().await;
        if engine.run_mode() != RunMode::Running {
            return TickFlow::Finish;
        }
        let events = engine.tick();
        self.publish(&engine, &events);
        if engine.run_mode() == RunMode::Running {
            TickFlow::Continue
        } else {
            TickFlow::Finish
        }
    }

    fn publish(&self, engine: &SessionEngine, events: &[Event]) {
        self.state_tx.send_replace(engine.snapshot());
        for event in events {
            match event {
                Event::SessionCompleted {
                    total_secs,
                    finished_early,
                    ..
                } => info!(total_secs, finished_early, "training completed"),
                Event::IntervalAdvanced {
                    to_index,
                    name,
                    skipped,
                    ..
                } => debug!(to_index, name = %name, skipped, "interval advanced"),
                _ => {}
            }
            // No subscribers is fine.
            let _ = self.events_tx.send(event.clone());
        }
    }
}

/// Handle to a running-or-idle training session.
///
/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct TrainingSession {
    shared: Arc<Shared>,
    driver: Arc<Mutex<TickDriver>>,
}

impl TrainingSession {
    pub fn new(options: SessionOptions) -> Self {
        let engine = SessionEngine::new();
        let (state_tx, _) = watch::channel(engine.snapshot());
        let (events_tx, _) = broadcast::channel(options.event_buffer.max(1));
        Self {
            shared: Arc::new(Shared {
                engine: Mutex::new(engine),
                state_tx,
                events_tx,
            }),
            driver: Arc::new(Mutex::new(TickDriver::new(options.tick_interval))),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Latest published state.
    pub fn snapshot(&self) -> SessionState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn projection(&self) -> Projection {
        Projection::of(&self.shared.state_tx.borrow())
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.shared.events_tx.subscribe()
    }

    pub async fn is_ticking(&self) -> bool {
        self.driver.lock().await.is_active()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the sequence. Any active driver is stopped first.
    pub async fn load(&self, sequence: IntervalSequence) -> Vec<Event> {
        let mut driver = self.driver.lock().await;
        driver.stop();
        info!(
            intervals = sequence.len(),
            total_secs = sequence.total_duration_secs(),
            "loading sequence"
        );
        let (events, _) = self.shared.apply(Command::Load(sequence)).await;
        events
    }

    pub async fn start(&self) -> Vec<Event> {
        self.command(Command::Start).await
    }

    pub async fn pause(&self) -> Vec<Event> {
        self.command(Command::Pause).await
    }

    pub async fn resume(&self) -> Vec<Event> {
        self.command(Command::Resume).await
    }

    pub async fn stop(&self) -> Vec<Event> {
        self.command(Command::Stop).await
    }

    pub async fn reset(&self) -> Vec<Event> {
        self.command(Command::Reset).await
    }

    pub async fn skip_to_next(&self) -> Vec<Event> {
        self.command(Command::SkipToNext).await
    }

    /// Single play/pause control: start when idle, pause when running,
    /// resume when paused. Does nothing once completed.
    pub async fn toggle(&self) -> Vec<Event> {
        let command = match self.snapshot().run_mode {
            RunMode::Idle => Command::Start,
            RunMode::Running => Command::Pause,
            RunMode::Paused => Command::Resume,
            RunMode::Completed => return Vec::new(),
        };
        self.command(command).await
    }

    /// Stop ticking without touching the session state.
    pub async fn shutdown(&self) {
        self.driver.lock().await.stop();
    }

    async fn command(&self, command: Command) -> Vec<Event> {
        let mut driver = self.driver.lock().await;
        let (events, mode) = self.shared.apply(command).await;
        if mode == RunMode::Running {
            let shared = self.shared.clone();
            driver.start(move || {
                let shared = shared.clone();
                async move { shared.tick().await }
            });
        } else {
            driver.stop();
        }
        events
    }
}

impl Default for TrainingSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}
