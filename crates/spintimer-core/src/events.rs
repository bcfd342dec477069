use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::IntervalCategory;

/// Every accepted session command produces one or more Events.
/// The presentation layer subscribes to them for sounds, bells and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SequenceLoaded {
        interval_count: usize,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TrainingStarted {
        interval_index: usize,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TrainingPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TrainingResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TrainingStopped {
        at: DateTime<Utc>,
    },
    TrainingReset {
        at: DateTime<Utc>,
    },
    /// The current interval changed, either by the clock or by a skip.
    IntervalAdvanced {
        from_index: usize,
        to_index: usize,
        name: String,
        category: IntervalCategory,
        duration_secs: u64,
        skipped: bool,
        at: DateTime<Utc>,
    },
    /// The last interval finished (or was skipped). Terminal until stop/reset/load.
    SessionCompleted {
        total_secs: u64,
        interval_count: usize,
        finished_early: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the boundary events produced by ticks and skips.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            Event::IntervalAdvanced { .. } | Event::SessionCompleted { .. }
        )
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
