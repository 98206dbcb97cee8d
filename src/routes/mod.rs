use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::{CatalogProvider, HistoryProvider},
        EngineSettings, RecommendationEngine,
    },
};

pub mod consumption;
pub mod drinks;
pub mod recommendations;

/// Shared handles every handler needs
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub history: Arc<dyn HistoryProvider>,
    pub engine: RecommendationEngine,
}

impl AppState {
    /// Wires one engine to the same providers the browsing endpoints use
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        history: Arc<dyn HistoryProvider>,
        settings: EngineSettings,
    ) -> Self {
        let engine = RecommendationEngine::new(catalog.clone(), history.clone(), settings);
        Self {
            catalog,
            history,
            engine,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drinks", get(drinks::list).post(drinks::create))
        .route(
            "/drinks/:id",
            get(drinks::get).put(drinks::update).delete(drinks::delete),
        )
        .route(
            "/consumption",
            post(consumption::record).get(consumption::list),
        )
        .route("/recommend", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
