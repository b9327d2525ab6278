use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::PriceRow;

/// Shortest accepted search term.
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SupplierParams {
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkItem {
    pub sku: String,
    pub quantity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BulkPriceRequest {
    pub products: Vec<BulkItem>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPriceResult {
    pub sku: String,
    pub quantity: f64,
    pub found: bool,
    pub best_price: Option<PriceRow>,
    pub all_prices: Vec<PriceRow>,
}

/// One supplier offer in the per-SKU response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOffer {
    pub supplier: String,
    pub price: f64,
    pub unit: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: Option<i64>,
    pub location: String,
    pub url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl From<PriceRow> for SupplierOffer {
    fn from(row: PriceRow) -> Self {
        Self {
            supplier: row.supplier_name,
            price: row.price,
            unit: row.unit,
            in_stock: row.in_stock,
            stock_quantity: row.stock_quantity,
            location: row.location,
            url: row.url,
            scraped_at: row.scraped_at,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Location-scoped prices when a location is given, else every price.
async fn lookup_prices(db: &Database, sku: &str, location: Option<&str>) -> anyhow::Result<Vec<PriceRow>> {
    match non_empty(location) {
        Some(location) => db.get_prices_by_location(location, sku).await,
        None => db.get_prices_for_product(sku).await,
    }
}

/// GET /api/products/search?q=
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();

    if term.chars().count() < MIN_QUERY_LEN {
        return Err(ApiError::BadRequest(format!(
            "Query must be at least {MIN_QUERY_LEN} characters"
        )));
    }

    let products = state.db.search_products(term).await?;
    Ok(Json(json!({
        "success": true,
        "count": products.len(),
        "products": products,
    })))
}

/// GET /api/products/:sku/prices?location=
pub async fn prices_for_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let prices = lookup_prices(&state.db, &sku, params.location.as_deref()).await?;

    let Some(first) = prices.first() else {
        return Err(ApiError::NotFound("Product not found".to_string()));
    };

    let product = json!({
        "sku": first.sku,
        "name": first.name,
        "manufacturer": first.manufacturer,
    });
    let offers: Vec<SupplierOffer> = prices.into_iter().map(SupplierOffer::from).collect();

    Ok(Json(json!({
        "success": true,
        "product": product,
        "prices": offers,
    })))
}

/// POST /api/products/prices
pub async fn bulk_prices(
    State(state): State<AppState>,
    payload: Result<Json<BulkPriceRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let mut results = Vec::with_capacity(request.products.len());

    for item in request.products {
        let prices = lookup_prices(&state.db, &item.sku, request.location.as_deref()).await?;
        results.push(BulkPriceResult {
            quantity: item.quantity.filter(|q| *q > 0.0).unwrap_or(1.0),
            found: !prices.is_empty(),
            best_price: prices.first().cloned(),
            all_prices: prices,
            sku: item.sku,
        });
    }

    Ok(Json(json!({ "success": true, "results": results })))
}

/// GET /api/suppliers/locations?supplier=
pub async fn supplier_locations(
    State(state): State<AppState>,
    params: Result<Query<SupplierParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let locations = state
        .db
        .supplier_locations(non_empty(params.supplier.as_deref()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": locations.len(),
        "locations": locations,
    })))
}
