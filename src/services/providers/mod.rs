//! Upstream data sources for the recommendation engine
//!
//! The engine only ever reads through these traits, so the Postgres-backed
//! stores, the Redis-cached catalog and in-memory test doubles are
//! interchangeable.
use async_trait::async_trait;
use chrono::Duration;

use crate::{
    error::AppResult,
    models::{ConsumptionRecord, DrinkId, DrinkRecord, HistoryEntry, NewDrink, UserId},
};

pub mod cached;
pub mod postgres;

pub use cached::CachedCatalogProvider;
pub use postgres::{PgCatalogProvider, PgHistoryProvider};

/// Source of the drink catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch every catalog row, including rows that may turn out malformed
    async fn fetch_catalog(&self) -> AppResult<Vec<DrinkRecord>>;

    /// Fetch one catalog row by id
    async fn fetch_drink(&self, id: DrinkId) -> AppResult<Option<DrinkRecord>>;

    /// Add a drink, returning the stored row
    async fn create_drink(&self, drink: &NewDrink) -> AppResult<DrinkRecord>;

    /// Replace a drink; `None` when no drink has `id`
    async fn update_drink(&self, id: DrinkId, drink: &NewDrink)
        -> AppResult<Option<DrinkRecord>>;

    /// Remove a drink and its consumption rows; `false` when no drink has `id`
    async fn delete_drink(&self, id: DrinkId) -> AppResult<bool>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Source and sink of per-user consumption history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Entries newer than `now - window` on the store's own clock, newest first
    async fn fetch_recent_history(
        &self,
        user_id: UserId,
        window: Duration,
    ) -> AppResult<Vec<HistoryEntry>>;

    /// The user's whole history, newest first
    async fn fetch_history(&self, user_id: UserId) -> AppResult<Vec<HistoryEntry>>;

    /// Record that `user_id` just had `drink_id`
    async fn record_consumption(
        &self,
        user_id: UserId,
        drink_id: DrinkId,
    ) -> AppResult<ConsumptionRecord>;
}
