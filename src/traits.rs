//! Traits and interfaces for supplier-agnostic scraping

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Listing;

/// Configuration for a supplier scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Supplier name as stored with prices and scrape jobs
    pub name: String,
    /// Base URL for the supplier website
    pub base_url: String,
    /// Page URL pattern with a {query} placeholder
    pub url_pattern: String,
    /// Search terms or category paths substituted into the pattern
    pub targets: Vec<String>,
    /// CSS selectors for extracting data
    pub selectors: SiteSelectors,
    /// Category stored with new products
    pub category: String,
    /// Unit stored with prices
    pub unit: String,
    /// Link stored when a listing has none of its own
    pub fallback_url: Option<String>,
}

/// Ordered CSS selector alternatives for the parts of a product listing.
///
/// Sites change markup often; the first alternative that yields a non-empty
/// value wins.
#[derive(Debug, Clone, Default)]
pub struct SiteSelectors {
    /// Container selectors for individual products
    pub product_container: Vec<String>,
    /// Name selectors within a container
    pub name: Vec<String>,
    /// Price selectors within a container
    pub price: Vec<String>,
    /// SKU selectors within a container (text or `data-sku` attribute)
    pub sku: Vec<String>,
    /// Container attributes carrying the SKU, checked before `sku`
    pub sku_attributes: Vec<String>,
    /// Image selectors within a container
    pub image: Vec<String>,
    /// Product link selectors within a container
    pub link: Vec<String>,
}

/// Trait for supplier-specific scrapers
#[async_trait]
pub trait SupplierScraper: Send + Sync {
    /// Get the configuration for this scraper
    fn config(&self) -> &ScraperConfig;

    /// Fetch every target page and return the listings found
    ///
    /// Individual pages that fail are logged and skipped; an error means
    /// no page could be scraped at all.
    async fn scrape(&self) -> Result<Vec<Listing>>;

    /// Build the page URL for one target
    fn target_url(&self, target: &str) -> String {
        let encoded = urlencoding::encode(target);
        self.config().url_pattern.replace("{query}", &encoded)
    }

    fn name(&self) -> &str {
        &self.config().name
    }
}
