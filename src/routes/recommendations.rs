use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{Caller, RequestId},
    models::{PreferenceProfile, ScoredDrink},
    routes::AppState,
};

/// Handler for the recommendation endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Caller(user_id): Caller,
    Json(preferences): Json<PreferenceProfile>,
) -> AppResult<Json<Vec<ScoredDrink>>> {
    tracing::info!(
        request_id = %request_id,
        user_id,
        preferences = ?preferences,
        "Processing recommendation request"
    );

    let recommendations = state.engine.recommend(user_id, &preferences).await?;
    Ok(Json(recommendations))
}
