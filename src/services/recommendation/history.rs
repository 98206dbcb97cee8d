use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::models::{DrinkId, HistoryEntry};

/// How far back consumption history influences a recommendation
pub const HISTORY_WINDOW_HOURS: i64 = 12;

/// Above this share of alcoholic drinks the safety rules take over
pub const SOBERING_RATIO: f64 = 0.5;

pub fn default_window() -> Duration {
    Duration::hours(HISTORY_WINDOW_HOURS)
}

/// Entries newer than `now - window`
///
/// There is no upper bound. Timestamps are stamped by the history store's
/// clock, which may run ahead of ours, and a drink logged a moment ago must
/// still count.
fn within_window<'a>(
    history: &'a [HistoryEntry],
    now: DateTime<Utc>,
    window: Duration,
) -> impl Iterator<Item = &'a HistoryEntry> {
    let since = now - window;
    history.iter().filter(move |entry| entry.consumed_at > since)
}

/// What the recent history says about the user, reduced to what scoring needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySignals {
    pub recent_drink_ids: HashSet<DrinkId>,
    /// Alcoholic entries over all entries; 0 with no history
    pub alcohol_ratio: f64,
    pub recent_alcoholic_count: usize,
}

impl HistorySignals {
    /// Aggregates the entries that fall inside the window ending at `now`
    ///
    /// The provider already applies the window on its own clock; rows older
    /// than the window are dropped again here so stale rows never count.
    pub fn aggregate(history: &[HistoryEntry], now: DateTime<Utc>, window: Duration) -> Self {
        let mut recent_drink_ids = HashSet::new();
        let mut total = 0usize;
        let mut alcoholic = 0usize;

        for entry in within_window(history, now, window) {
            total += 1;
            if entry.drink_type.is_alcoholic() {
                alcoholic += 1;
            }
            recent_drink_ids.insert(entry.drink_id);
        }

        Self {
            recent_drink_ids,
            alcohol_ratio: alcoholic as f64 / total.max(1) as f64,
            recent_alcoholic_count: alcoholic,
        }
    }

    /// True once the user has mostly been drinking alcohol
    pub fn over_sobering_ratio(&self) -> bool {
        self.alcohol_ratio > SOBERING_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrinkType;

    fn entry(drink_id: DrinkId, drink_type: DrinkType, hours_ago: i64, now: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            drink_id,
            drink_type,
            name: format!("drink-{}", drink_id),
            consumed_at: now - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_empty_history_has_zero_ratio() {
        let signals = HistorySignals::aggregate(&[], Utc::now(), default_window());
        assert_eq!(signals, HistorySignals::default());
        assert_eq!(signals.alcohol_ratio, 0.0);
        assert!(!signals.over_sobering_ratio());
    }

    #[test]
    fn test_ratio_and_count() {
        let now = Utc::now();
        let history = vec![
            entry(1, DrinkType::Alcoholic, 1, now),
            entry(2, DrinkType::Alcoholic, 2, now),
            entry(1, DrinkType::Alcoholic, 3, now),
            entry(3, DrinkType::NonAlcoholic, 4, now),
        ];

        let signals = HistorySignals::aggregate(&history, now, default_window());
        assert_eq!(signals.alcohol_ratio, 0.75);
        assert_eq!(signals.recent_alcoholic_count, 3);
        assert_eq!(signals.recent_drink_ids, HashSet::from([1, 2, 3]));
        assert!(signals.over_sobering_ratio());
    }

    #[test]
    fn test_half_half_is_not_counted_as_alcoholic() {
        let now = Utc::now();
        let history = vec![
            entry(1, DrinkType::HalfHalf, 1, now),
            entry(2, DrinkType::Alcoholic, 1, now),
        ];

        let signals = HistorySignals::aggregate(&history, now, default_window());
        assert_eq!(signals.alcohol_ratio, 0.5);
        // exactly one half is not "over"
        assert!(!signals.over_sobering_ratio());
    }

    #[test]
    fn test_entries_outside_window_are_ignored() {
        let now = Utc::now();
        let history = vec![
            entry(1, DrinkType::NonAlcoholic, 1, now),
            // exactly at the lower bound: excluded
            entry(2, DrinkType::Alcoholic, HISTORY_WINDOW_HOURS, now),
            entry(3, DrinkType::Alcoholic, 20, now),
        ];

        let signals = HistorySignals::aggregate(&history, now, default_window());
        assert_eq!(signals.recent_drink_ids, HashSet::from([1]));
        assert_eq!(signals.recent_alcoholic_count, 0);
        assert_eq!(signals.alcohol_ratio, 0.0);
    }

    #[test]
    fn test_entries_stamped_ahead_of_local_clock_still_count() {
        let now = Utc::now();
        let ahead = now + Duration::milliseconds(200);
        let history: Vec<HistoryEntry> = (1..=3)
            .map(|id| HistoryEntry {
                drink_id: id,
                drink_type: DrinkType::Alcoholic,
                name: format!("drink-{}", id),
                consumed_at: ahead,
            })
            .collect();

        let signals = HistorySignals::aggregate(&history, now, default_window());
        assert_eq!(signals.recent_alcoholic_count, 3);
        assert_eq!(signals.alcohol_ratio, 1.0);
        assert_eq!(signals.recent_drink_ids, HashSet::from([1, 2, 3]));
        assert!(signals.over_sobering_ratio());
    }

    #[test]
    fn test_entry_at_now_is_included() {
        let now = Utc::now();
        let history = vec![entry(5, DrinkType::Alcoholic, 0, now)];

        let signals = HistorySignals::aggregate(&history, now, default_window());
        assert_eq!(signals.recent_alcoholic_count, 1);
        assert_eq!(signals.alcohol_ratio, 1.0);
    }
}
