use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use crate::ai::{PriceDiscoveryRequest, ProductQuery};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ParseQuoteRequest {
    pub text: String,
}

/// POST /api/ai/parse-quote
pub async fn parse_quote(
    State(state): State<AppState>,
    payload: Result<Json<ParseQuoteRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Quote text is required".to_string()));
    }

    let parsed = state.llm.parse_quote_text(&request.text).await;
    let error = parsed
        .items
        .is_empty()
        .then_some("No items could be parsed");

    Ok(Json(json!({
        "success": !parsed.items.is_empty(),
        "items": parsed.items,
        "source": parsed.source,
        "error": error,
    })))
}

/// POST /api/ai/identify-product
pub async fn identify_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductQuery>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(query) = payload?;
    if query.is_empty() {
        return Err(ApiError::BadRequest(
            "Provide a product name or SKU".to_string(),
        ));
    }

    let product = state.llm.identify_product(&query).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

/// POST /api/ai/price-discovery
pub async fn price_discovery(
    State(state): State<AppState>,
    payload: Result<Json<PriceDiscoveryRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    if request.material.trim().is_empty() {
        return Err(ApiError::BadRequest("Material is required".to_string()));
    }

    let discovery = state.llm.discover_prices(&request).await;
    Ok(Json(json!({ "success": true, "pricing": discovery })))
}
