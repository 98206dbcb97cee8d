//! Drink recommendation engine
//!
//! A call fetches the catalog and the user's recent history concurrently,
//! then runs a synchronous pipeline over the two snapshots:
//!
//! 1. aggregate the history window into [`HistorySignals`]
//! 2. score every well-formed catalog drink with the [`Scorer`]
//! 3. rank and pick at most five drinks with the bucketed [`selector`]
//!
//! A failing catalog read fails the call. A failing history read does not;
//! the engine carries on as if the user had drunk nothing recently.
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{self, DrinkRecord, HistoryEntry, PreferenceProfile, ScoredDrink, UserId},
    services::providers::{CatalogProvider, HistoryProvider},
};

pub mod history;
pub mod scorer;
pub mod selector;

pub use history::HistorySignals;
pub use scorer::{HydrationKeywords, JitterSource, NoJitter, RngJitter, Scorer};

/// Tunables of the engine that are not part of the scoring rules
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub history_window: Duration,
    pub hydration_keywords: HydrationKeywords,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            history_window: history::default_window(),
            hydration_keywords: HydrationKeywords::default(),
        }
    }
}

pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider>,
    history: Arc<dyn HistoryProvider>,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        history: Arc<dyn HistoryProvider>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            history,
            settings,
        }
    }

    /// Recommends up to five drinks for `user_id`
    pub async fn recommend(
        &self,
        user_id: UserId,
        preferences: &PreferenceProfile,
    ) -> AppResult<Vec<ScoredDrink>> {
        let mut jitter = RngJitter::new(StdRng::from_entropy());
        self.recommend_with(user_id, preferences, &mut jitter).await
    }

    /// Same as [`recommend`](Self::recommend) with a caller-supplied jitter source
    pub async fn recommend_with(
        &self,
        user_id: UserId,
        preferences: &PreferenceProfile,
        jitter: &mut (dyn JitterSource + Send),
    ) -> AppResult<Vec<ScoredDrink>> {
        let start = Instant::now();
        let (catalog, history) = self.fetch_snapshots(user_id).await?;

        let result = self.rank(catalog, &history, preferences, Utc::now(), jitter);

        tracing::info!(
            user_id,
            returned = result.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendation completed"
        );

        Ok(result)
    }

    /// Reads catalog and history at the same time
    async fn fetch_snapshots(
        &self,
        user_id: UserId,
    ) -> AppResult<(Vec<DrinkRecord>, Vec<HistoryEntry>)> {
        let (catalog, history) = tokio::join!(
            self.catalog.fetch_catalog(),
            self.history
                .fetch_recent_history(user_id, self.settings.history_window),
        );

        let catalog = catalog.map_err(|e| {
            tracing::error!(
                provider = self.catalog.name(),
                error = %e,
                "Catalog fetch failed"
            );
            AppError::CatalogUnavailable(e.to_string())
        })?;

        let history = history.unwrap_or_else(|e| {
            tracing::warn!(
                user_id,
                error = %e,
                "History unavailable, recommending as if no recent drinks"
            );
            Vec::new()
        });

        Ok((catalog, history))
    }

    /// Runs aggregation, scoring and selection over already fetched snapshots
    pub fn rank(
        &self,
        catalog: Vec<DrinkRecord>,
        history: &[HistoryEntry],
        preferences: &PreferenceProfile,
        now: DateTime<Utc>,
        jitter: &mut dyn JitterSource,
    ) -> Vec<ScoredDrink> {
        let signals = HistorySignals::aggregate(history, now, self.settings.history_window);

        tracing::debug!(
            alcohol_ratio = signals.alcohol_ratio,
            recent_alcoholic = signals.recent_alcoholic_count,
            "Aggregated recent history"
        );

        let scorer = Scorer::new(preferences, &signals, &self.settings.hydration_keywords);
        let scored: Vec<ScoredDrink> = models::well_formed(catalog)
            .into_iter()
            .map(|drink| ScoredDrink {
                score: scorer.score(&drink, jitter),
                drink,
            })
            .collect();

        let ranked = selector::rank(scored);
        selector::select(&ranked, selector::alcoholic_cap(&signals))
    }
}
