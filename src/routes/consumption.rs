use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::Caller,
    models::{ConsumptionRecord, ConsumptionRequest, HistoryEntry},
    routes::AppState,
};

/// Logs a drink for the caller
pub async fn record(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Json(request): Json<ConsumptionRequest>,
) -> AppResult<(StatusCode, Json<ConsumptionRecord>)> {
    let record = state
        .history
        .record_consumption(user_id, request.drink_id)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// The caller's history, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let history = state.history.fetch_history(user_id).await?;
    Ok(Json(history))
}
