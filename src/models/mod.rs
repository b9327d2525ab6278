//! Data models for products, supplier prices, branches and scrape runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Location recorded for prices that are not tied to a supplier branch.
pub const NATIONAL: &str = "National";

/// A catalog product, unique by SKU
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when inserting or refreshing a product
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Fields written when inserting or refreshing a supplier price
#[derive(Debug, Clone)]
pub struct NewPrice {
    pub product_id: i64,
    pub supplier_name: String,
    pub supplier_sku: Option<String>,
    pub price: f64,
    pub unit: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: Option<i64>,
    pub location: String,
    pub url: Option<String>,
}

/// A supplier price joined with the product it belongs to
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub id: i64,
    pub product_id: i64,
    pub supplier_name: String,
    pub supplier_sku: Option<String>,
    pub price: f64,
    pub unit: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: Option<i64>,
    pub location: String,
    pub url: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub sku: String,
    pub name: String,
    pub manufacturer: Option<String>,
}

/// A geocoded supplier branch
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierLocation {
    pub id: i64,
    pub supplier_name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplierLocation {
    pub supplier_name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Lifecycle of a scrape job row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Running,
    Completed,
    Failed,
}

/// One logged run of a supplier scraper
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeJob {
    pub id: i64,
    pub supplier_name: String,
    pub status: ScrapeStatus,
    pub products_found: i64,
    pub errors: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A product listing extracted from a supplier page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub url: Option<String>,
}
