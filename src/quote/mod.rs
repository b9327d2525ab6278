//! Per-vendor quote comparison over a project scope
//!
//! A scope lists the materials a job needs. Each vendor carries a sparse
//! price map keyed by material id; a quote prices the whole scope for one
//! vendor, flags the gaps and adds tax and delivery charges.

pub mod landed;
pub mod units;
pub mod variance;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use landed::{LandedCost, calculate_landed_cost};
pub use variance::{VarianceAlert, VarianceReport, detect_variance};

/// Scope quantity that fills one pallet.
pub const UNITS_PER_PALLET: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeItem {
    pub id: String,
    pub qty: f64,
}

/// A material the scope can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub default_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pricing: HashMap<String, f64>,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub pallet_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub qty: f64,
    pub unit_price: f64,
    pub line_total: f64,
    pub missing_price: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuote {
    pub vendor_id: String,
    pub vendor_name: String,
    pub line_items: Vec<LineItem>,
    #[serde(flatten)]
    pub cost: LandedCost,
    pub pallet_count: u32,
    /// Percentage of scope items this vendor prices above zero
    pub completeness: u32,
}

fn catalog_entry(id: &str, name: &str, unit: &str, default_price: f64) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        default_price,
    }
}

/// Materials offered in the scope editor when no catalog is supplied.
pub fn default_catalog() -> Vec<CatalogItem> {
    vec![
        catalog_entry("OC-DUR-DRIFT", "Owens Corning Duration - Driftwood", "Sq", 115.00),
        catalog_entry("OC-DUR-ONYX", "Owens Corning Duration - Onyx Black", "Sq", 115.00),
        catalog_entry("IWS-ROLL", "Ice & Water Shield (Generic)", "Rolls", 65.00),
        catalog_entry("SYN-FELT", "Synthetic Underlayment", "Rolls", 45.00),
        catalog_entry("DRIP-EDGE", "Drip Edge (White) 10'", "Pcs", 8.50),
        catalog_entry("HIP-RIDGE", "Hip & Ridge Shingles", "Bdl", 55.00),
        catalog_entry("COIL-NAILS", "Coil Nails 1-1/4\"", "Box", 35.00),
    ]
}

/// Pallets needed to deliver the whole scope.
pub fn pallet_count(scope: &[ScopeItem]) -> u32 {
    let units: f64 = scope.iter().map(|item| item.qty.max(0.0)).sum();
    // Saturating float-to-int cast
    (units / UNITS_PER_PALLET).ceil() as u32
}

/// Prices the whole scope for one vendor.
pub fn calculate_vendor_quote(scope: &[ScopeItem], vendor: &Vendor, catalog: &[CatalogItem]) -> VendorQuote {
    let line_items: Vec<LineItem> = scope
        .iter()
        .map(|item| {
            let entry = catalog.iter().find(|c| c.id == item.id);
            let unit_price = vendor.pricing.get(&item.id).copied().unwrap_or(0.0);

            LineItem {
                id: item.id.clone(),
                name: entry.map_or_else(|| item.id.clone(), |c| c.name.clone()),
                unit: entry.map_or_else(|| "Units".to_string(), |c| c.unit.clone()),
                qty: item.qty,
                unit_price,
                line_total: unit_price * item.qty,
                missing_price: unit_price == 0.0,
            }
        })
        .collect();

    let priced = line_items.iter().filter(|line| line.unit_price > 0.0).count();
    let completeness = if scope.is_empty() {
        0
    } else {
        (100.0 * priced as f64 / scope.len() as f64).round() as u32
    };

    let pallets = pallet_count(scope);
    let cost = calculate_landed_cost(
        &line_items,
        vendor.tax_rate,
        vendor.delivery_fee,
        vendor.pallet_fee,
        pallets,
    );

    VendorQuote {
        vendor_id: vendor.id.clone(),
        vendor_name: vendor.name.clone(),
        line_items,
        cost,
        pallet_count: pallets,
        completeness,
    }
}

/// Quotes for every vendor, in vendor order.
pub fn compare_vendors(scope: &[ScopeItem], vendors: &[Vendor], catalog: &[CatalogItem]) -> Vec<VendorQuote> {
    vendors
        .iter()
        .map(|vendor| calculate_vendor_quote(scope, vendor, catalog))
        .collect()
}
