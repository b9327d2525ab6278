//! REST API over the price store, the scrape runner and the quote tools.

pub mod ai;
pub mod products;
pub mod quotes;
pub mod scrape;

use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::ai::LlmClient;
use crate::database::Database;
use crate::jobs::ScrapeRunner;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub runner: ScrapeRunner,
    pub llm: Arc<LlmClient>,
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/products/search", get(products::search))
        .route("/api/products/prices", post(products::bulk_prices))
        .route("/api/products/:sku/prices", get(products::prices_for_sku))
        .route("/api/suppliers/locations", get(products::supplier_locations))
        .route("/api/scrape/run", post(scrape::run))
        .route("/api/scrape/jobs", get(scrape::jobs))
        .route("/api/quotes/compare", post(quotes::compare))
        .route("/api/quotes/rank", post(quotes::rank))
        .route("/api/quotes/assemble", post(quotes::assemble))
        .route("/api/ai/parse-quote", post(ai::parse_quote))
        .route("/api/ai/identify-product", post(ai::identify_product))
        .route("/api/ai/price-discovery", post(ai::price_discovery))
        .with_state(state)
}
