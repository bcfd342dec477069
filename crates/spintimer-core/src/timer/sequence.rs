use serde::{Deserialize, Serialize};

use super::interval::IntervalDefinition;
use crate::error::{Result, SequenceError};

/// An ordered, validated list of intervals.
///
/// Built once and never mutated afterwards. The cumulative end offsets are
/// computed at build time so boundary checks during playback are O(1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IntervalDefinition>", into = "Vec<IntervalDefinition>")]
pub struct IntervalSequence {
    intervals: Vec<IntervalDefinition>,
    /// `ends[i]` is the elapsed second at which interval `i` finishes.
    ends: Vec<u64>,
}

impl IntervalSequence {
    /// Validate `definitions` and build a sequence.
    ///
    /// Fails if the list is empty, or if any interval has a zero duration or
    /// a blank name.
    pub fn build(definitions: Vec<IntervalDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(SequenceError::Empty.into());
        }
        for (index, def) in definitions.iter().enumerate() {
            if def.name.trim().is_empty() {
                return Err(SequenceError::BlankName { index }.into());
            }
            if def.duration_secs == 0 {
                return Err(SequenceError::NonPositiveDuration {
                    index,
                    name: def.name.clone(),
                }
                .into());
            }
        }

        let ends = definitions
            .iter()
            .scan(0u64, |acc, def| {
                *acc = acc.saturating_add(def.duration_secs);
                Some(*acc)
            })
            .collect();

        Ok(Self {
            intervals: definitions,
            ends,
        })
    }

    /// The "nothing configured" sequence. A session cannot be started on it.
    pub fn empty() -> Self {
        Self {
            intervals: Vec::new(),
            ends: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[IntervalDefinition] {
        &self.intervals
    }

    pub fn get(&self, index: usize) -> Option<&IntervalDefinition> {
        self.intervals.get(index)
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Elapsed second at which interval `index` begins.
    pub fn start_of(&self, index: usize) -> u64 {
        match index {
            0 => 0,
            i => self.ends.get(i - 1).copied().unwrap_or_else(|| self.total_duration_secs()),
        }
    }

    /// Elapsed second at which interval `index` ends.
    pub fn end_of(&self, index: usize) -> u64 {
        self.ends
            .get(index)
            .copied()
            .unwrap_or_else(|| self.total_duration_secs())
    }

    /// Index of the interval containing `elapsed_secs`.
    ///
    /// At or past the total duration this is the last interval.
    pub fn index_at(&self, elapsed_secs: u64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let idx = self.ends.partition_point(|&end| end <= elapsed_secs);
        Some(idx.min(self.len() - 1))
    }
}

impl Default for IntervalSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<IntervalDefinition>> for IntervalSequence {
    type Error = crate::error::CoreError;

    fn try_from(definitions: Vec<IntervalDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Ok(Self::empty());
        }
        Self::build(definitions)
    }
}

impl From<IntervalSequence> for Vec<IntervalDefinition> {
    fn from(seq: IntervalSequence) -> Self {
        seq.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::timer::IntervalCategory;
    use proptest::prelude::*;

    fn seq(durations: &[u64]) -> IntervalSequence {
        IntervalSequence::build(
            durations
                .iter()
                .enumerate()
                .map(|(i, &d)| IntervalDefinition::new(format!("I{i}"), d, IntervalCategory::Custom))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn empty_is_rejected() {
        let err = IntervalSequence::build(Vec::new()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSequence(SequenceError::Empty)));
    }

    #[test]
    fn blank_name_is_rejected() {
        let defs = vec![IntervalDefinition::new("  ", 10, IntervalCategory::Custom)];
        let err = IntervalSequence::build(defs).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidSequence(SequenceError::BlankName { index: 0 })
        ));
    }

    #[test]
    fn boundaries() {
        let s = seq(&[5, 3, 4]);
        assert_eq!(s.total_duration_secs(), 12);
        assert_eq!(s.start_of(0), 0);
        assert_eq!(s.start_of(1), 5);
        assert_eq!(s.start_of(2), 8);
        assert_eq!(s.end_of(2), 12);
    }

    #[test]
    fn index_at_uses_half_open_ranges() {
        let s = seq(&[5, 3, 4]);
        assert_eq!(s.index_at(0), Some(0));
        assert_eq!(s.index_at(4), Some(0));
        assert_eq!(s.index_at(5), Some(1));
        assert_eq!(s.index_at(7), Some(1));
        assert_eq!(s.index_at(8), Some(2));
        assert_eq!(s.index_at(12), Some(2));
        assert_eq!(s.index_at(99), Some(2));
        assert_eq!(IntervalSequence::empty().index_at(0), None);
    }

    #[test]
    fn serde_revalidates() {
        let s = seq(&[5, 3]);
        let json = serde_json::to_string(&s).unwrap();
        let back: IntervalSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);

        let mut raw: serde_json::Value = serde_json::from_str(&json).unwrap();
        raw[0]["duration_secs"] = serde_json::json!(0);
        assert!(serde_json::from_value::<IntervalSequence>(raw).is_err());
    }

    proptest! {
        #[test]
        fn total_is_sum_of_durations(durations in prop::collection::vec(1u64..10_000, 1..40)) {
            let s = seq(&durations);
            prop_assert_eq!(s.total_duration_secs(), durations.iter().sum::<u64>());
        }

        #[test]
        fn zero_duration_anywhere_fails(
            durations in prop::collection::vec(1u64..600, 0..20),
            at in 0usize..20,
        ) {
            let mut durations = durations;
            let at = at.min(durations.len());
            durations.insert(at, 0);
            let defs = durations
                .iter()
                .map(|&d| IntervalDefinition::new("x", d, IntervalCategory::Medium))
                .collect();
            let result = IntervalSequence::build(defs);
            let is_invalid = matches!(
                result,
                Err(CoreError::InvalidSequence(SequenceError::NonPositiveDuration { .. }))
            );
            prop_assert!(is_invalid);
        }

        #[test]
        fn index_at_matches_linear_scan(
            durations in prop::collection::vec(1u64..50, 1..20),
            elapsed in 0u64..1_000,
        ) {
            let s = seq(&durations);
            let mut acc = 0;
            let mut expected = durations.len() - 1;
            for (i, d) in durations.iter().enumerate() {
                acc += d;
                if elapsed < acc {
                    expected = i;
                    break;
                }
            }
            prop_assert_eq!(s.index_at(elapsed), Some(expected));
        }
    }
}
