//! Derived time projections.
//!
//! Pure functions of a [`SessionState`] snapshot. Nothing here is cached;
//! recompute from every new snapshot.

use serde::Serialize;

use super::engine::{RunMode, SessionState};
use super::interval::IntervalDefinition;

/// Display values derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub run_mode: RunMode,
    pub current_index: Option<usize>,
    pub interval_count: usize,
    pub elapsed_secs: u64,
    pub total_secs: u64,
    pub remaining_total_secs: u64,
    pub current_interval_elapsed_secs: u64,
    pub current_interval_remaining_secs: u64,
    /// 0.0 ..= 1.0 within the current interval.
    pub progress_fraction: f64,
    /// 0.0 ..= 1.0 across the whole sequence.
    pub session_progress_fraction: f64,
    pub is_last_interval: bool,
    /// Whether a skip command would currently be accepted.
    pub can_skip: bool,
    pub current_interval: Option<IntervalDefinition>,
    pub next_interval: Option<IntervalDefinition>,
}

impl Projection {
    pub fn of(state: &SessionState) -> Self {
        let seq = &state.sequence;
        let total = seq.total_duration_secs();
        let elapsed = state.elapsed_secs;

        let (interval_elapsed, interval_remaining, fraction) = match state.current_index {
            Some(idx) => {
                let duration = seq.get(idx).map(|i| i.duration_secs).unwrap_or(0);
                let into = elapsed.saturating_sub(seq.start_of(idx)).min(duration);
                let fraction = if duration == 0 {
                    0.0
                } else {
                    into as f64 / duration as f64
                };
                (into, duration - into, fraction)
            }
            None => (0, 0, 0.0),
        };

        let is_last_interval = state
            .current_index
            .is_some_and(|idx| idx + 1 == seq.len());

        Self {
            run_mode: state.run_mode,
            current_index: state.current_index,
            interval_count: seq.len(),
            elapsed_secs: elapsed,
            total_secs: total,
            remaining_total_secs: total.saturating_sub(elapsed),
            current_interval_elapsed_secs: interval_elapsed,
            current_interval_remaining_secs: interval_remaining,
            progress_fraction: fraction.clamp(0.0, 1.0),
            session_progress_fraction: if total == 0 {
                0.0
            } else {
                (elapsed as f64 / total as f64).min(1.0)
            },
            is_last_interval,
            can_skip: matches!(state.run_mode, RunMode::Running | RunMode::Paused),
            current_interval: state.current_index.and_then(|i| seq.get(i).cloned()),
            next_interval: state.current_index.and_then(|i| seq.get(i + 1).cloned()),
        }
    }
}

/// Render seconds as `m:ss`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{IntervalCategory, IntervalSequence, SessionEngine};
    use proptest::prelude::*;

    fn engine(durations: &[u64]) -> SessionEngine {
        let defs = durations
            .iter()
            .map(|&d| IntervalDefinition::new("x", d, IntervalCategory::Intense))
            .collect();
        let mut engine = SessionEngine::new();
        engine.load(IntervalSequence::build(defs).unwrap());
        engine
    }

    #[test]
    fn empty_state_projects_zeros() {
        let p = Projection::of(&SessionState::default());
        assert_eq!(p.total_secs, 0);
        assert_eq!(p.remaining_total_secs, 0);
        assert_eq!(p.progress_fraction, 0.0);
        assert!(!p.is_last_interval);
        assert!(!p.can_skip);
        assert!(p.current_interval.is_none());
    }

    #[test]
    fn mid_interval_values() {
        let mut e = engine(&[5, 3, 4]);
        e.start();
        for _ in 0..6 {
            e.tick();
        }
        let p = Projection::of(&e.snapshot());
        assert_eq!(p.current_index, Some(1));
        assert_eq!(p.remaining_total_secs, 6);
        assert_eq!(p.current_interval_elapsed_secs, 1);
        assert_eq!(p.current_interval_remaining_secs, 2);
        assert!((p.progress_fraction - 1.0 / 3.0).abs() < 1e-9);
        assert!((p.session_progress_fraction - 0.5).abs() < 1e-9);
        assert!(!p.is_last_interval);
        assert!(p.can_skip);
        assert_eq!(p.next_interval.map(|i| i.duration_secs), Some(4));
    }

    #[test]
    fn completed_is_full() {
        let mut e = engine(&[2, 2]);
        e.start();
        for _ in 0..4 {
            e.tick();
        }
        let p = Projection::of(&e.snapshot());
        assert_eq!(p.run_mode, RunMode::Completed);
        assert!(p.is_last_interval);
        assert_eq!(p.remaining_total_secs, 0);
        assert_eq!(p.current_interval_remaining_secs, 0);
        assert_eq!(p.progress_fraction, 1.0);
        assert!(!p.can_skip);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(3600), "60:00");
    }

    proptest! {
        #[test]
        fn remaining_plus_elapsed_is_total(
            durations in prop::collection::vec(1u64..8, 1..6),
            steps in prop::collection::vec(0u8..3, 0..60),
        ) {
            let mut e = engine(&durations);
            e.start();
            for step in steps {
                match step {
                    0 => { e.tick(); }
                    1 => { e.skip_to_next(); }
                    _ => { e.pause(); e.resume(); }
                }
                let p = Projection::of(&e.snapshot());
                prop_assert_eq!(p.remaining_total_secs + p.elapsed_secs, p.total_secs);
                prop_assert!((0.0..=1.0).contains(&p.progress_fraction));
                prop_assert_eq!(
                    p.current_interval_elapsed_secs + p.current_interval_remaining_secs,
                    p.current_interval.as_ref().map(|i| i.duration_secs).unwrap_or(0)
                );
            }
        }
    }
}
