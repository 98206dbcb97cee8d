use rand::Rng;

use super::history::HistorySignals;
use crate::models::{Drink, DrinkCategory, PreferenceProfile};

const TYPE_MATCH: f64 = 2.0;
const STYLE_MATCH: f64 = 2.0;
const CATEGORY_MATCH: f64 = 2.0;
const DRUNKENNESS_MATCH: f64 = 3.0;
const HYDRATION_BOOST: f64 = 20.0;
const SOBERING_PENALTY: f64 = 15.0;
const STREAK_BONUS: f64 = 10.0;
const REPEAT_PENALTY: f64 = 5.0;

/// More alcoholic drinks than this in the window earns non-alcoholic drinks a bonus
const STREAK_LENGTH: usize = 2;

/// Jitter is drawn from `[0, JITTER_MAX)`
pub const JITTER_MAX: f64 = 3.0;

/// Supplies the random addend each score gets
pub trait JitterSource {
    fn sample(&mut self) -> f64;
}

/// Uniform jitter backed by any random number generator
pub struct RngJitter<R> {
    rng: R,
}

impl<R: Rng> RngJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> JitterSource for RngJitter<R> {
    fn sample(&mut self) -> f64 {
        self.rng.gen_range(0.0..JITTER_MAX)
    }
}

/// Jitter frozen at zero, making scores fully deterministic
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

/// Lower-cased name fragments identifying water and electrolyte drinks
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationKeywords(Vec<String>);

impl HydrationKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.0.iter().any(|keyword| name.contains(keyword.as_str()))
    }
}

impl Default for HydrationKeywords {
    fn default() -> Self {
        Self::new(crate::config::default_hydration_keywords())
    }
}

/// Rule-based scorer for one recommendation call
///
/// Every rule is evaluated for every drink and the contributions are summed;
/// rules never exclude each other.
pub struct Scorer<'a> {
    preferences: &'a PreferenceProfile,
    signals: &'a HistorySignals,
    hydration: &'a HydrationKeywords,
}

impl<'a> Scorer<'a> {
    pub fn new(
        preferences: &'a PreferenceProfile,
        signals: &'a HistorySignals,
        hydration: &'a HydrationKeywords,
    ) -> Self {
        Self {
            preferences,
            signals,
            hydration,
        }
    }

    /// Score including one jitter sample
    pub fn score(&self, drink: &Drink, jitter: &mut dyn JitterSource) -> f64 {
        self.base_score(drink) + jitter.sample()
    }

    /// Deterministic part of the score
    pub fn base_score(&self, drink: &Drink) -> f64 {
        let prefs = self.preferences;
        let mut score = 0.0;

        if prefs.drink_type == Some(drink.drink_type) {
            score += TYPE_MATCH;
        }
        if prefs.preferred_style.as_deref() == Some(drink.style.as_str()) {
            score += STYLE_MATCH;
        }
        if drink.category == DrinkCategory::Both
            || prefs
                .participant_type
                .is_some_and(|participant| participant.suits(drink.category))
        {
            score += CATEGORY_MATCH;
        }
        if prefs.desired_drunkenness_level == Some(drink.drunkenness_level) {
            score += DRUNKENNESS_MATCH;
        }

        let over_limit = self.signals.over_sobering_ratio();
        if over_limit && self.hydration.matches(&drink.name) {
            score += HYDRATION_BOOST;
        }
        if over_limit && drink.drink_type.is_alcoholic() {
            score -= SOBERING_PENALTY;
        }
        if self.signals.recent_alcoholic_count > STREAK_LENGTH && !drink.drink_type.is_alcoholic() {
            score += STREAK_BONUS;
        }
        if self.signals.recent_drink_ids.contains(&drink.id) {
            score -= REPEAT_PENALTY;
        }

        score
    }
}
