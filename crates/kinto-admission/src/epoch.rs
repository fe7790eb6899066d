//! Epoch selection by block height.

use crate::{ConfigError, KintoSpecId, RuleSet};

/// A range of blocks governed by one rule set.
///
/// The epoch is active for every height strictly greater than `start_block_exclusive`, up to and
/// including the threshold of the next epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Epoch {
    /// The admission version of the epoch.
    pub spec: KintoSpecId,
    /// The last height *not* governed by this epoch.
    pub start_block_exclusive: u64,
    /// The rules applied within the epoch.
    pub rules: RuleSet,
}

impl Epoch {
    /// Returns `true` if the epoch's rules govern blocks at `height` or later ones.
    pub const fn has_started_at(&self, height: u64) -> bool {
        height > self.start_block_exclusive
    }
}

/// An ordered table of epochs.
///
/// Thresholds are strictly increasing and spec ids never go backwards. Below or at the first
/// threshold no policy applies.
#[derive(Clone, Debug, Default, PartialEq, Eq, derive_more::Deref)]
pub struct EpochSchedule {
    epochs: Vec<Epoch>,
}

impl EpochSchedule {
    /// Builds a schedule from `epochs`, which must already be in activation order.
    pub fn new(epochs: impl IntoIterator<Item = Epoch>) -> Result<Self, ConfigError> {
        let mut schedule = Self::default();
        for epoch in epochs {
            schedule.push(epoch)?;
        }
        Ok(schedule)
    }

    /// Appends `epoch`. Its threshold must exceed every existing one.
    ///
    /// Appending never changes which epoch is active at heights at or below the new threshold.
    pub fn push(&mut self, epoch: Epoch) -> Result<(), ConfigError> {
        if let Some(previous) = self.epochs.last() {
            if epoch.start_block_exclusive <= previous.start_block_exclusive ||
                epoch.spec < previous.spec
            {
                return Err(ConfigError::UnorderedEpochs {
                    spec: epoch.spec,
                    start_block_exclusive: epoch.start_block_exclusive,
                    previous_spec: previous.spec,
                    previous_start_block_exclusive: previous.start_block_exclusive,
                });
            }
        }
        self.epochs.push(epoch);
        Ok(())
    }

    /// Returns the index of the epoch active at `height`.
    pub fn active_index(&self, height: u64) -> Option<usize> {
        self.epochs.partition_point(|epoch| epoch.has_started_at(height)).checked_sub(1)
    }

    /// Returns the epoch active at `height`, or `None` if no policy applies yet.
    pub fn active_at(&self, height: u64) -> Option<&Epoch> {
        self.active_index(height).and_then(|index| self.epochs.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AllowList, StaticRules};

    fn epoch(spec: KintoSpecId, start_block_exclusive: u64) -> Epoch {
        Epoch {
            spec,
            start_block_exclusive,
            rules: RuleSet::StaticAllowList(StaticRules::allow_list_only(AllowList::new())),
        }
    }

    fn schedule() -> EpochSchedule {
        EpochSchedule::new([
            epoch(KintoSpecId::ORIGINAL, 100),
            epoch(KintoSpecId::HARDFORK1, 110),
            epoch(KintoSpecId::HARDFORK3, 200),
        ])
        .unwrap()
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let schedule = schedule();
        let spec_at = |height| schedule.active_at(height).map(|epoch| epoch.spec);

        assert_eq!(spec_at(0), None);
        assert_eq!(spec_at(100), None);
        assert_eq!(spec_at(101), Some(KintoSpecId::ORIGINAL));
        assert_eq!(spec_at(110), Some(KintoSpecId::ORIGINAL));
        assert_eq!(spec_at(111), Some(KintoSpecId::HARDFORK1));
        assert_eq!(spec_at(200), Some(KintoSpecId::HARDFORK1));
        assert_eq!(spec_at(u64::MAX), Some(KintoSpecId::HARDFORK3));
    }

    #[test]
    fn test_selection_is_monotonic() {
        let schedule = schedule();
        let mut previous = None;
        for height in 0..300 {
            let index = schedule.active_index(height);
            assert!(index >= previous, "height {height}");
            previous = index;
        }
    }

    #[test]
    fn test_append_preserves_history() {
        let mut schedule = schedule();
        let before: Vec<_> = (0..=250).map(|h| schedule.active_index(h)).collect();
        schedule.push(epoch(KintoSpecId::HARDFORK4, 250)).unwrap();
        let after: Vec<_> = (0..=250).map(|h| schedule.active_index(h)).collect();
        assert_eq!(before, after);
        assert_eq!(schedule.active_at(251).map(|epoch| epoch.spec), Some(KintoSpecId::HARDFORK4));
    }

    #[test]
    fn test_unordered_epochs_rejected() {
        let err = EpochSchedule::new([
            epoch(KintoSpecId::ORIGINAL, 100),
            epoch(KintoSpecId::HARDFORK1, 100),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnorderedEpochs { start_block_exclusive: 100, .. }));

        let err = EpochSchedule::new([
            epoch(KintoSpecId::HARDFORK3, 100),
            epoch(KintoSpecId::HARDFORK1, 200),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnorderedEpochs { spec: KintoSpecId::HARDFORK1, .. }));
    }

    #[test]
    fn test_empty_schedule_has_no_policy() {
        assert!(EpochSchedule::default().active_at(1_000_000).is_none());
    }
}
