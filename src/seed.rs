//! Sample catalog for local development
//!
//! `roofsource seed` loads a handful of common roofing products with
//! national prices from three suppliers, plus a few supplier branches, so
//! the API has something to answer before the first scrape.

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info};

use crate::database::Database;
use crate::models::{NATIONAL, NewPrice, NewProduct, NewSupplierLocation};
use crate::scrapers::{abc_supply, home_depot};

const BEACON: &str = "Beacon";

struct SampleProduct {
    sku: &'static str,
    name: &'static str,
    manufacturer: &'static str,
    category: &'static str,
    unit: &'static str,
    prices: &'static [(&'static str, f64)],
}

const SAMPLE_PRODUCTS: [SampleProduct; 10] = [
    SampleProduct {
        sku: "OC-DUR-DRIFT",
        name: "Owens Corning Duration Shingles - Driftwood",
        manufacturer: "Owens Corning",
        category: "Shingles",
        unit: "Square",
        prices: &[
            (abc_supply::SUPPLIER_NAME, 115.50),
            (home_depot::SUPPLIER_NAME, 118.99),
            (BEACON, 112.25),
        ],
    },
    SampleProduct {
        sku: "OC-DUR-ONYX",
        name: "Owens Corning Duration Shingles - Onyx Black",
        manufacturer: "Owens Corning",
        category: "Shingles",
        unit: "Square",
        prices: &[(abc_supply::SUPPLIER_NAME, 115.50), (home_depot::SUPPLIER_NAME, 119.99)],
    },
    SampleProduct {
        sku: "GAF-TIMB-SHAK",
        name: "GAF Timberline HDZ Shingles - Shakewood",
        manufacturer: "GAF",
        category: "Shingles",
        unit: "Square",
        prices: &[(abc_supply::SUPPLIER_NAME, 122.00), (BEACON, 119.50)],
    },
    SampleProduct {
        sku: "GAF-TIGER-PAWS",
        name: "GAF Tiger Paw Synthetic Underlayment",
        manufacturer: "GAF",
        category: "Underlayment",
        unit: "Roll",
        prices: &[(abc_supply::SUPPLIER_NAME, 48.00), (home_depot::SUPPLIER_NAME, 52.99)],
    },
    SampleProduct {
        sku: "GEN-ICE-WATER",
        name: "Ice & Water Shield Roll (Generic)",
        manufacturer: "Generic",
        category: "Underlayment",
        unit: "Roll",
        prices: &[
            (abc_supply::SUPPLIER_NAME, 65.00),
            (home_depot::SUPPLIER_NAME, 68.99),
            (BEACON, 62.50),
        ],
    },
    SampleProduct {
        sku: "DRP-EDGE-WHT-10",
        name: "Drip Edge White 10ft",
        manufacturer: "Generic",
        category: "Accessories",
        unit: "Piece",
        prices: &[(abc_supply::SUPPLIER_NAME, 9.25), (home_depot::SUPPLIER_NAME, 10.49)],
    },
    SampleProduct {
        sku: "COIL-NAIL-1.25",
        name: "Roofing Coil Nails 1-1/4\"",
        manufacturer: "Generic",
        category: "Fasteners",
        unit: "Box",
        prices: &[(abc_supply::SUPPLIER_NAME, 38.00), (home_depot::SUPPLIER_NAME, 39.99)],
    },
    SampleProduct {
        sku: "OC-WEATHERLOCK",
        name: "Owens Corning WeatherLock G Flex",
        manufacturer: "Owens Corning",
        category: "Underlayment",
        unit: "Roll",
        prices: &[(abc_supply::SUPPLIER_NAME, 72.00), (BEACON, 69.50)],
    },
    SampleProduct {
        sku: "CT-LANDMARK-MOIRE",
        name: "CertainTeed Landmark Shingles - Moire Black",
        manufacturer: "CertainTeed",
        category: "Shingles",
        unit: "Square",
        prices: &[(abc_supply::SUPPLIER_NAME, 118.00), (BEACON, 115.25)],
    },
    SampleProduct {
        sku: "AIR-VENT-RIDGE",
        name: "Ridge Vent Pro 4ft",
        manufacturer: "Air Vent Inc",
        category: "Ventilation",
        unit: "Piece",
        prices: &[(abc_supply::SUPPLIER_NAME, 28.50), (home_depot::SUPPLIER_NAME, 31.99)],
    },
];

/// (supplier, city, state, zip, latitude, longitude)
const SAMPLE_BRANCHES: [(&str, &str, &str, &str, f64, f64); 4] = [
    (abc_supply::SUPPLIER_NAME, "Toledo", "OH", "43612", 41.7083, -83.5497),
    (abc_supply::SUPPLIER_NAME, "Columbus", "OH", "43228", 39.9630, -83.1267),
    (home_depot::SUPPLIER_NAME, "Toledo", "OH", "43615", 41.6590, -83.6780),
    (BEACON, "Detroit", "MI", "48209", 42.3130, -83.1180),
];

/// Landing page stored as the price URL of a supplier.
fn supplier_url(supplier: &str) -> Option<String> {
    match supplier {
        abc_supply::SUPPLIER_NAME => Some(format!("{}/shop/roofing", abc_supply::BASE_URL)),
        home_depot::SUPPLIER_NAME => Some(format!(
            "{}/b/Building-Materials-Roofing/N-5yc1vZaq7q",
            home_depot::BASE_URL
        )),
        BEACON => Some("https://www.becn.com/products/roofing".to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub products: usize,
    pub prices: usize,
    pub branches: usize,
}

async fn seed_product(db: &Database, sample: &SampleProduct) -> Result<usize> {
    let product_id = db
        .upsert_product(&NewProduct {
            sku: sample.sku.to_string(),
            name: sample.name.to_string(),
            manufacturer: Some(sample.manufacturer.to_string()),
            category: Some(sample.category.to_string()),
            ..NewProduct::default()
        })
        .await?;

    for (supplier, price) in sample.prices {
        db.upsert_price(&NewPrice {
            product_id,
            supplier_name: (*supplier).to_string(),
            supplier_sku: Some(sample.sku.to_string()),
            price: *price,
            unit: Some(sample.unit.to_string()),
            in_stock: true,
            stock_quantity: None,
            location: NATIONAL.to_string(),
            url: supplier_url(supplier),
        })
        .await?;
    }

    Ok(sample.prices.len())
}

/// Loads the sample catalog. Safe to run repeatedly.
pub async fn seed_sample_data(db: &Database) -> Result<SeedSummary> {
    info!("Seeding {} sample products", SAMPLE_PRODUCTS.len());
    let mut summary = SeedSummary::default();

    for sample in &SAMPLE_PRODUCTS {
        match seed_product(db, sample).await {
            Ok(prices) => {
                summary.products += 1;
                summary.prices += prices;
            }
            Err(e) => error!("Error adding {}: {:#}", sample.sku, e),
        }
    }

    for (supplier, city, state, zip, latitude, longitude) in SAMPLE_BRANCHES {
        db.upsert_supplier_location(&NewSupplierLocation {
            supplier_name: supplier.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: Some(zip.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..NewSupplierLocation::default()
        })
        .await?;
        summary.branches += 1;
    }

    info!(
        "Added {} products with {} price points and {} branches",
        summary.products, summary.prices, summary.branches
    );
    Ok(summary)
}
