use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    db::{Cache, CacheKey},
    error::AppResult,
    models::{DrinkId, DrinkRecord, NewDrink},
    services::providers::CatalogProvider,
};

/// Catalog provider that keeps a short-lived snapshot in Redis
///
/// The catalog is read on every recommendation, so a small TTL takes most of
/// that load off Postgres. Redis failures are logged and the inner provider
/// answers instead; only the inner provider's errors reach the caller.
///
/// Catalog writes go straight to the inner provider. A write that changed a
/// row drops both the catalog snapshot and that row's entry.
pub struct CachedCatalogProvider {
    inner: Arc<dyn CatalogProvider>,
    cache: Cache,
    ttl: u64,
}

impl CachedCatalogProvider {
    pub fn new(inner: Arc<dyn CatalogProvider>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }

    async fn lookup<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.cache.get_from_cache(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, using {}", self.inner.name());
                None
            }
        }
    }

    fn invalidate(&self, id: DrinkId) {
        tracing::debug!(drink_id = id, "Invalidating cached catalog");
        self.cache
            .invalidate_in_background(&[CacheKey::Catalog, CacheKey::Drink(id)]);
    }
}

#[async_trait]
impl CatalogProvider for CachedCatalogProvider {
    async fn fetch_catalog(&self) -> AppResult<Vec<DrinkRecord>> {
        let key = CacheKey::Catalog;
        if let Some(rows) = self.lookup(&key).await {
            return Ok(rows);
        }

        let rows = self.inner.fetch_catalog().await?;
        self.cache.set_in_background(&key, &rows, self.ttl);
        Ok(rows)
    }

    async fn fetch_drink(&self, id: DrinkId) -> AppResult<Option<DrinkRecord>> {
        let key = CacheKey::Drink(id);
        if let Some(row) = self.lookup(&key).await {
            return Ok(Some(row));
        }

        let row = self.inner.fetch_drink(id).await?;
        if let Some(row) = &row {
            self.cache.set_in_background(&key, row, self.ttl);
        }
        Ok(row)
    }

    async fn create_drink(&self, drink: &NewDrink) -> AppResult<DrinkRecord> {
        let row = self.inner.create_drink(drink).await?;
        self.invalidate(row.id);
        Ok(row)
    }

    async fn update_drink(
        &self,
        id: DrinkId,
        drink: &NewDrink,
    ) -> AppResult<Option<DrinkRecord>> {
        let row = self.inner.update_drink(id, drink).await?;
        if row.is_some() {
            self.invalidate(id);
        }
        Ok(row)
    }

    async fn delete_drink(&self, id: DrinkId) -> AppResult<bool> {
        let deleted = self.inner.delete_drink(id).await?;
        if deleted {
            self.invalidate(id);
        }
        Ok(deleted)
    }

    fn name(&self) -> &'static str {
        "redis-cached"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{create_redis_client, redis::cache::CacheWriteMessage},
        error::AppError,
        models::{DrinkCategory, DrinkType, DrunkennessLevel},
        services::providers::MockCatalogProvider,
    };

    // Nothing listens here, so every cache call fails fast
    const DEAD_REDIS: &str = "redis://127.0.0.1:1";

    fn record(id: DrinkId) -> DrinkRecord {
        DrinkRecord {
            id,
            name: Some("Water".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_cache_falls_through_to_inner() {
        let mut inner = MockCatalogProvider::new();
        inner
            .expect_fetch_catalog()
            .times(1)
            .returning(|| Ok(vec![record(1), record(2)]));
        inner.expect_name().return_const("mock");

        let (cache, _handle) = Cache::new(create_redis_client(DEAD_REDIS).unwrap());
        let provider = CachedCatalogProvider::new(Arc::new(inner), cache, 60);

        let rows = provider.fetch_catalog().await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_inner_error_propagates() {
        let mut inner = MockCatalogProvider::new();
        inner
            .expect_fetch_drink()
            .returning(|_| Err(AppError::Internal("boom".to_string())));
        inner.expect_name().return_const("mock");

        let (cache, _handle) = Cache::new(create_redis_client(DEAD_REDIS).unwrap());
        let provider = CachedCatalogProvider::new(Arc::new(inner), cache, 60);

        assert!(provider.fetch_drink(9).await.is_err());
    }

    fn lemonade() -> NewDrink {
        NewDrink {
            name: "Lemonade".to_string(),
            drink_type: DrinkType::NonAlcoholic,
            style: "fresh".to_string(),
            category: DrinkCategory::Both,
            drunkenness_level: DrunkennessLevel::Sober,
            ingredients: None,
            alcohol_content: None,
        }
    }

    fn invalidation_of(id: DrinkId) -> CacheWriteMessage {
        CacheWriteMessage::Delete {
            keys: vec!["catalog:drinks".to_string(), format!("catalog:drink:{}", id)],
        }
    }

    #[tokio::test]
    async fn test_update_invalidates_catalog_and_row() {
        let mut inner = MockCatalogProvider::new();
        inner
            .expect_update_drink()
            .withf(|id, drink| *id == 4 && drink.name == "Lemonade")
            .times(1)
            .returning(|id, _| Ok(Some(record(id))));

        let (cache, mut queued) = Cache::without_writer(create_redis_client(DEAD_REDIS).unwrap());
        let provider = CachedCatalogProvider::new(Arc::new(inner), cache, 60);

        let row = provider.update_drink(4, &lemonade()).await.unwrap();
        assert_eq!(row.map(|r| r.id), Some(4));
        assert_eq!(queued.try_recv().unwrap(), invalidation_of(4));
        assert!(queued.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_and_delete_invalidate() {
        let mut inner = MockCatalogProvider::new();
        inner
            .expect_create_drink()
            .times(1)
            .returning(|_| Ok(record(11)));
        inner.expect_delete_drink().times(1).returning(|_| Ok(true));

        let (cache, mut queued) = Cache::without_writer(create_redis_client(DEAD_REDIS).unwrap());
        let provider = CachedCatalogProvider::new(Arc::new(inner), cache, 60);

        let created = provider.create_drink(&lemonade()).await.unwrap();
        assert_eq!(created.id, 11);
        assert_eq!(queued.try_recv().unwrap(), invalidation_of(11));

        assert!(provider.delete_drink(11).await.unwrap());
        assert_eq!(queued.try_recv().unwrap(), invalidation_of(11));
    }

    #[tokio::test]
    async fn test_missed_write_leaves_cache_alone() {
        let mut inner = MockCatalogProvider::new();
        inner.expect_update_drink().returning(|_, _| Ok(None));
        inner.expect_delete_drink().returning(|_| Ok(false));

        let (cache, mut queued) = Cache::without_writer(create_redis_client(DEAD_REDIS).unwrap());
        let provider = CachedCatalogProvider::new(Arc::new(inner), cache, 60);

        assert_eq!(provider.update_drink(99, &lemonade()).await.unwrap(), None);
        assert!(!provider.delete_drink(99).await.unwrap());
        assert!(queued.try_recv().is_err());
    }
}
