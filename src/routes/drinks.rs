use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::Caller,
    models::{well_formed, Drink, DrinkId, DrinkRecord, NewDrink},
    routes::AppState,
};

/// Lists the browsable catalog; malformed rows are left out
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Drink>>> {
    let rows = state
        .catalog
        .fetch_catalog()
        .await
        .map_err(|e| AppError::CatalogUnavailable(e.to_string()))?;
    Ok(Json(well_formed(rows)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<DrinkId>,
) -> AppResult<Json<Drink>> {
    let row = state
        .catalog
        .fetch_drink(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(stored(row)?))
}

/// Adds a drink to the catalog
pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Json(input): Json<NewDrink>,
) -> AppResult<(StatusCode, Json<Drink>)> {
    input.validate()?;
    let row = state.catalog.create_drink(&input).await?;
    tracing::info!(user_id, drink_id = row.id, "Drink created");
    Ok((StatusCode::CREATED, Json(stored(row)?)))
}

/// Replaces every descriptive field of a drink
pub async fn update(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(id): Path<DrinkId>,
    Json(input): Json<NewDrink>,
) -> AppResult<Json<Drink>> {
    input.validate()?;
    let row = state
        .catalog
        .update_drink(id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id, drink_id = id, "Drink updated");
    Ok(Json(stored(row)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(id): Path<DrinkId>,
) -> AppResult<StatusCode> {
    if !state.catalog.delete_drink(id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id, drink_id = id, "Drink deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: DrinkId) -> AppError {
    AppError::NotFound(format!("Drink {} not found", id))
}

fn stored(row: DrinkRecord) -> AppResult<Drink> {
    Drink::try_from(row).map_err(|e| {
        tracing::warn!(error = %e, "Stored drink is malformed");
        AppError::Internal(e.to_string())
    })
}
