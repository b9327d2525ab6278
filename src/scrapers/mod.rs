//! Supplier-specific scrapers

pub mod abc_supply;
pub mod home_depot;

use anyhow::{Result, bail};

use crate::config::ScraperSettings;
use crate::scraper::Scraper;
use crate::traits::SupplierScraper;

pub use abc_supply::AbcSupplyScraper;
pub use home_depot::HomeDepotScraper;

/// Supplier keys accepted in `scraper.suppliers`.
pub const SUPPLIER_KEYS: [&str; 2] = ["abc-supply", "home-depot"];

/// Builds the enabled scrapers in configuration order.
pub fn build_scrapers(settings: &ScraperSettings) -> Result<Vec<Box<dyn SupplierScraper>>> {
    let scraper = Scraper::new(settings)?;

    settings
        .suppliers
        .iter()
        .map(|key| -> Result<Box<dyn SupplierScraper>> {
            match key.as_str() {
                "abc-supply" => Ok(Box::new(AbcSupplyScraper::new(scraper.clone()))),
                "home-depot" => Ok(Box::new(HomeDepotScraper::new(scraper.clone()))),
                other => bail!(
                    "Unknown supplier '{}', expected one of: {}",
                    other,
                    SUPPLIER_KEYS.join(", ")
                ),
            }
        })
        .collect()
}
