//! # spintimer Core Library
//!
//! Business logic for the spintimer interval-training timer. The CLI binary
//! is a thin terminal front end over this crate.
//!
//! ## Architecture
//!
//! - **Interval Sequence**: validated, immutable list of timed intervals with
//!   a precomputed cumulative-end table
//! - **Session Engine**: synchronous state machine (Idle, Running, Paused,
//!   Completed) driven by commands and one-second ticks
//! - **Tick Driver**: cancellable tokio task delivering ticks while a session
//!   is running
//! - **Projections**: pure display values computed from state snapshots
//! - **Storage**: SQLite saved sets and TOML configuration
//! - **Transfer**: JSON import/export of sequences
//!
//! ## Key Components
//!
//! - [`TrainingSession`]: owning handle tying the engine to the tick driver
//! - [`SessionEngine`]: the state machine itself
//! - [`Projection`]: derived time values for display
//! - [`Database`]: saved-set persistence
//! - [`Config`]: application configuration

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod transfer;

pub use error::{ConfigError, CoreError, DatabaseError, SequenceError};
pub use events::Event;
pub use storage::{Config, Database, SavedSet};
pub use timer::{
    format_clock, Command, IntervalCategory, IntervalDefinition, IntervalSequence, Projection,
    RunMode, SessionEngine, SessionOptions, SessionState, TickDriver, TickFlow, TrainingSession,
};
pub use transfer::{export_json, import_json, ExportedInterval, ExportedTraining, ImportedTraining};
