//! Postgres-backed catalog and history stores
//!
//! Queries are checked at runtime (`query_as`) rather than with the compile-time
//! macros, so the crate builds without a live database.
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{
        ConsumptionRecord, DrinkId, DrinkRecord, DrinkType, HistoryEntry, NewDrink, UserId,
    },
    services::providers::{CatalogProvider, HistoryProvider},
};

const CATALOG_COLUMNS: &str =
    "id, name, type, style, ingredients, alcohol_content, category, drunkenness_level";

#[derive(Clone)]
pub struct PgCatalogProvider {
    pool: PgPool,
}

impl PgCatalogProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogProvider for PgCatalogProvider {
    async fn fetch_catalog(&self) -> AppResult<Vec<DrinkRecord>> {
        let query = format!("SELECT {} FROM drinks ORDER BY id", CATALOG_COLUMNS);
        let rows = sqlx::query_as::<_, DrinkRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(rows = rows.len(), "Fetched catalog from database");
        Ok(rows)
    }

    async fn fetch_drink(&self, id: DrinkId) -> AppResult<Option<DrinkRecord>> {
        let query = format!("SELECT {} FROM drinks WHERE id = $1", CATALOG_COLUMNS);
        let row = sqlx::query_as::<_, DrinkRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_drink(&self, drink: &NewDrink) -> AppResult<DrinkRecord> {
        let query = format!(
            r#"
            INSERT INTO drinks
                (name, type, style, ingredients, alcohol_content, category, drunkenness_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CATALOG_COLUMNS
        );
        let row = sqlx::query_as::<_, DrinkRecord>(&query)
            .bind(&drink.name)
            .bind(drink.drink_type.as_str())
            .bind(&drink.style)
            .bind(&drink.ingredients)
            .bind(drink.alcohol_content)
            .bind(drink.category.as_str())
            .bind(drink.drunkenness_level.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(drink_id = row.id, name = %drink.name, "Added drink to catalog");
        Ok(row)
    }

    async fn update_drink(
        &self,
        id: DrinkId,
        drink: &NewDrink,
    ) -> AppResult<Option<DrinkRecord>> {
        let query = format!(
            r#"
            UPDATE drinks
            SET name = $1, type = $2, style = $3, ingredients = $4, alcohol_content = $5,
                category = $6, drunkenness_level = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            CATALOG_COLUMNS
        );
        let row = sqlx::query_as::<_, DrinkRecord>(&query)
            .bind(&drink.name)
            .bind(drink.drink_type.as_str())
            .bind(&drink.style)
            .bind(&drink.ingredients)
            .bind(drink.alcohol_content)
            .bind(drink.category.as_str())
            .bind(drink.drunkenness_level.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if row.is_some() {
            tracing::info!(drink_id = id, "Updated drink");
        }
        Ok(row)
    }

    async fn delete_drink(&self, id: DrinkId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(drink_id = id, "Deleted drink");
        }
        Ok(deleted)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Clone)]
pub struct PgHistoryProvider {
    pool: PgPool,
}

impl PgHistoryProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_within(
        &self,
        user_id: UserId,
        window: Option<Duration>,
    ) -> AppResult<Vec<HistoryEntry>> {
        // The window is measured against the database clock, the same clock
        // that stamped `consumed_at`
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT ch.drink_id, d.type, d.name, ch.consumed_at
            FROM consumption_history ch
            JOIN drinks d ON ch.drink_id = d.id
            WHERE ch.user_id = $1
              AND ($2::interval IS NULL OR ch.consumed_at > NOW() - $2::interval)
            ORDER BY ch.consumed_at DESC
            "#,
        )
        .bind(user_id)
        .bind(window)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(HistoryRow::into_entry).collect())
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    drink_id: DrinkId,
    #[sqlx(rename = "type")]
    drink_type: String,
    name: String,
    consumed_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_entry(self) -> Option<HistoryEntry> {
        match self.drink_type.parse::<DrinkType>() {
            Ok(drink_type) => Some(HistoryEntry {
                drink_id: self.drink_id,
                drink_type,
                name: self.name,
                consumed_at: self.consumed_at,
            }),
            Err(e) => {
                tracing::warn!(drink_id = self.drink_id, error = %e, "Skipping history entry");
                None
            }
        }
    }
}

#[async_trait]
impl HistoryProvider for PgHistoryProvider {
    async fn fetch_recent_history(
        &self,
        user_id: UserId,
        window: Duration,
    ) -> AppResult<Vec<HistoryEntry>> {
        self.fetch_within(user_id, Some(window)).await
    }

    async fn fetch_history(&self, user_id: UserId) -> AppResult<Vec<HistoryEntry>> {
        self.fetch_within(user_id, None).await
    }

    async fn record_consumption(
        &self,
        user_id: UserId,
        drink_id: DrinkId,
    ) -> AppResult<ConsumptionRecord> {
        let record = sqlx::query_as::<_, ConsumptionRecord>(
            r#"
            INSERT INTO consumption_history (user_id, drink_id)
            VALUES ($1, $2)
            RETURNING id, user_id, drink_id, consumed_at
            "#,
        )
        .bind(user_id)
        .bind(drink_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("Drink {} not found", drink_id))
            }
            other => AppError::Database(other),
        })?;

        tracing::info!(user_id, drink_id, "Recorded consumption");
        Ok(record)
    }
}
