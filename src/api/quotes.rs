//! Quote comparison and vendor ranking endpoints. Stateless.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiResult;
use crate::quote::{CatalogItem, ScopeItem, Vendor, compare_vendors, default_catalog, detect_variance};
use crate::ranking::{JobContext, MaterialChoice, VendorOffer, rank_vendors, summarize};

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub scope: Vec<ScopeItem>,
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub catalog: Option<Vec<CatalogItem>>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub offers: Vec<VendorOffer>,
    #[serde(default)]
    pub context: JobContext,
}

#[derive(Debug, Deserialize)]
pub struct MaterialOffers {
    pub material: String,
    #[serde(default)]
    pub offers: Vec<VendorOffer>,
}

#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    pub materials: Vec<MaterialOffers>,
    #[serde(default)]
    pub context: JobContext,
}

/// POST /api/quotes/compare
pub async fn compare(payload: Result<Json<CompareRequest>, JsonRejection>) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let catalog = request.catalog.unwrap_or_else(default_catalog);

    let quotes = compare_vendors(&request.scope, &request.vendors, &catalog);
    let variance = detect_variance(&quotes, &request.scope);

    Ok(Json(json!({
        "success": true,
        "quotes": quotes,
        "variance": variance,
    })))
}

/// POST /api/quotes/rank
pub async fn rank(payload: Result<Json<RankRequest>, JsonRejection>) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let ranked = rank_vendors(&request.offers, &request.context);

    Ok(Json(json!({
        "success": true,
        "count": ranked.len(),
        "vendors": ranked,
    })))
}

/// POST /api/quotes/assemble
pub async fn assemble(payload: Result<Json<AssembleRequest>, JsonRejection>) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;

    let materials: Vec<MaterialChoice> = request
        .materials
        .into_iter()
        .map(|m| MaterialChoice::new(m.material, rank_vendors(&m.offers, &request.context)))
        .collect();
    let summary = summarize(&materials);

    Ok(Json(json!({
        "success": true,
        "materials": materials,
        "summary": summary,
    })))
}
