//! Session state machine.
//!
//! The engine is a pure, synchronous state machine. It has no clock of its
//! own: the caller (normally [`super::TickDriver`]) applies one `tick()` per
//! elapsed second while the session is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |          |
//!            +----------+--> Completed
//! any --(stop | reset | load)--> Idle
//! ```
//!
//! Commands issued in a run mode that does not permit them are ignored and
//! return no events.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new();
//! engine.load(sequence);
//! engine.start();
//! // once per second:
//! for event in engine.tick() { /* IntervalAdvanced / SessionCompleted */ }
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sequence::IntervalSequence;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Nothing loaded, loaded but not started, or explicitly stopped.
    Idle,
    Running,
    Paused,
    Completed,
}

/// The closed set of commands the engine understands.
#[derive(Debug, Clone)]
pub enum Command {
    Load(IntervalSequence),
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
    Tick,
    SkipToNext,
}

/// Immutable view of the session at one point on the timeline.
///
/// Cloning is cheap: the sequence is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub sequence: Arc<IntervalSequence>,
    /// `None` iff the sequence is empty.
    pub current_index: Option<usize>,
    pub elapsed_secs: u64,
    pub run_mode: RunMode,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            sequence: Arc::new(IntervalSequence::empty()),
            current_index: None,
            elapsed_secs: 0,
            run_mode: RunMode::Idle,
        }
    }
}

impl SessionState {
    pub fn total_duration_secs(&self) -> u64 {
        self.sequence.total_duration_secs()
    }

    pub fn has_next(&self) -> bool {
        self.current_index
            .is_some_and(|idx| idx + 1 < self.sequence.len())
    }
}

/// Single owner of a [`SessionState`]. Only its methods mutate the state.
#[derive(Debug, Clone, Default)]
pub struct SessionEngine {
    state: SessionState,
}

impl SessionEngine {
    /// Create an engine with an empty sequence in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn run_mode(&self) -> RunMode {
        self.state.run_mode
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.state.elapsed_secs
    }

    pub fn sequence(&self) -> &IntervalSequence {
        &self.state.sequence
    }

    /// Copy of the current state for readers.
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::Load(sequence) => self.load(sequence).into_iter().collect(),
            Command::Start => self.start().into_iter().collect(),
            Command::Pause => self.pause().into_iter().collect(),
            Command::Resume => self.resume().into_iter().collect(),
            Command::Stop => self.stop().into_iter().collect(),
            Command::Reset => self.reset().into_iter().collect(),
            Command::Tick => self.tick(),
            Command::SkipToNext => self.skip_to_next().into_iter().collect(),
        }
    }

    /// Replace the sequence and return to `Idle` at the beginning.
    pub fn load(&mut self, sequence: IntervalSequence) -> Option<Event> {
        let interval_count = sequence.len();
        let total_secs = sequence.total_duration_secs();
        self.state = SessionState {
            current_index: if sequence.is_empty() { None } else { Some(0) },
            sequence: Arc::new(sequence),
            elapsed_secs: 0,
            run_mode: RunMode::Idle,
        };
        Some(Event::SequenceLoaded {
            interval_count,
            total_secs,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.state.run_mode != RunMode::Idle || self.state.sequence.is_empty() {
            debug!(mode = ?self.state.run_mode, "start ignored");
            return None;
        }
        self.state.run_mode = RunMode::Running;
        Some(Event::TrainingStarted {
            interval_index: self.state.current_index.unwrap_or(0),
            total_secs: self.state.total_duration_secs(),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.run_mode != RunMode::Running {
            debug!(mode = ?self.state.run_mode, "pause ignored");
            return None;
        }
        self.state.run_mode = RunMode::Paused;
        Some(Event::TrainingPaused {
            elapsed_secs: self.state.elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.run_mode != RunMode::Paused {
            debug!(mode = ?self.state.run_mode, "resume ignored");
            return None;
        }
        self.state.run_mode = RunMode::Running;
        Some(Event::TrainingResumed {
            elapsed_secs: self.state.elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        self.rewind();
        Some(Event::TrainingStopped { at: Utc::now() })
    }

    /// Same effect as [`Self::stop`]; kept separate so the event says which
    /// control the user pressed.
    pub fn reset(&mut self) -> Option<Event> {
        self.rewind();
        Some(Event::TrainingReset { at: Utc::now() })
    }

    /// Advance the clock by one second.
    ///
    /// Ignored unless `Running`. Returns the boundary events crossed.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.state.run_mode != RunMode::Running {
            return Vec::new();
        }
        let Some(mut index) = self.state.current_index else {
            return Vec::new();
        };

        self.state.elapsed_secs += 1;
        let mut events = Vec::new();
        // Sequences reject zero-length intervals, so this crosses at most
        // one boundary per tick.
        while self.state.elapsed_secs >= self.state.sequence.end_of(index) {
            if index + 1 < self.state.sequence.len() {
                events.push(self.advance_from(index, false));
                index += 1;
            } else {
                events.push(self.complete(false));
                break;
            }
        }
        events
    }

    /// Jump to the start of the next interval, or finish the session early
    /// when already on the last one.
    ///
    /// Only valid while `Running` or `Paused`; the run mode is kept unless
    /// the session completes.
    pub fn skip_to_next(&mut self) -> Option<Event> {
        if !matches!(self.state.run_mode, RunMode::Running | RunMode::Paused) {
            debug!(mode = ?self.state.run_mode, "skip ignored");
            return None;
        }
        let index = self.state.current_index?;
        if self.state.has_next() {
            self.state.elapsed_secs = self.state.sequence.end_of(index);
            Some(self.advance_from(index, true))
        } else {
            let early = self.state.elapsed_secs < self.state.total_duration_secs();
            Some(self.complete(early))
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rewind(&mut self) {
        self.state.run_mode = RunMode::Idle;
        self.state.elapsed_secs = 0;
        self.state.current_index = if self.state.sequence.is_empty() {
            None
        } else {
            Some(0)
        };
    }

    fn advance_from(&mut self, index: usize, skipped: bool) -> Event {
        let next = index + 1;
        self.state.current_index = Some(next);
        let (name, category, duration_secs) = self
            .state
            .sequence
            .get(next)
            .map(|i| (i.name.clone(), i.category, i.duration_secs))
            .unwrap_or_default();
        Event::IntervalAdvanced {
            from_index: index,
            to_index: next,
            name,
            category,
            duration_secs,
            skipped,
            at: Utc::now(),
        }
    }

    fn complete(&mut self, finished_early: bool) -> Event {
        let total = self.state.total_duration_secs();
        self.state.elapsed_secs = total;
        self.state.run_mode = RunMode::Completed;
        Event::SessionCompleted {
            total_secs: total,
            interval_count: self.state.sequence.len(),
            finished_early,
            at: Utc::now(),
        }
    }
}
