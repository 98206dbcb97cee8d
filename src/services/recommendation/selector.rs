use std::collections::HashSet;

use super::history::HistorySignals;
use crate::models::{DrinkId, ScoredDrink};

/// Size of a full recommendation
pub const MAX_RESULTS: usize = 5;

/// How many alcoholic drinks a result may hold for this history
pub fn alcoholic_cap(signals: &HistorySignals) -> usize {
    if signals.over_sobering_ratio() {
        1
    } else {
        2
    }
}

/// Orders scored drinks best first
///
/// The sort is stable, so equal scores keep catalog order; with live jitter
/// exact ties practically never happen.
pub fn rank(mut scored: Vec<ScoredDrink>) -> Vec<ScoredDrink> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Picks up to [`MAX_RESULTS`] drinks from a ranked list under bucket caps
///
/// The first pass walks the list best first, admitting alcoholic drinks up to
/// `max_alcoholic` and the rest up to `MAX_RESULTS - max_alcoholic`. If that
/// leaves the result short, the best remaining non-alcoholic drinks fill the
/// gap; alcoholic drinks never exceed their cap.
pub fn select(ranked: &[ScoredDrink], max_alcoholic: usize) -> Vec<ScoredDrink> {
    let max_alcoholic = max_alcoholic.min(MAX_RESULTS);
    let max_other = MAX_RESULTS - max_alcoholic;

    let mut selected: Vec<ScoredDrink> = Vec::with_capacity(MAX_RESULTS);
    let mut taken: HashSet<DrinkId> = HashSet::new();
    let mut alcoholic = 0usize;
    let mut other = 0usize;

    for candidate in ranked {
        if selected.len() >= MAX_RESULTS {
            break;
        }
        if taken.contains(&candidate.drink.id) {
            continue;
        }

        if candidate.drink.drink_type.is_alcoholic() {
            if alcoholic < max_alcoholic {
                alcoholic += 1;
            } else {
                continue;
            }
        } else if other < max_other {
            other += 1;
        } else {
            continue;
        }

        taken.insert(candidate.drink.id);
        selected.push(candidate.clone());
    }

    while selected.len() < MAX_RESULTS {
        let backfill = ranked
            .iter()
            .find(|c| !c.drink.drink_type.is_alcoholic() && !taken.contains(&c.drink.id));

        match backfill {
            Some(candidate) => {
                taken.insert(candidate.drink.id);
                selected.push(candidate.clone());
            }
            None => break,
        }
    }

    selected
}
