//! ABC Supply category-page scraper

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::Listing;
use crate::scraper::Scraper;
use crate::traits::{ScraperConfig, SiteSelectors, SupplierScraper};

pub const SUPPLIER_NAME: &str = "ABC Supply";
pub const BASE_URL: &str = "https://www.abcsupply.com";

const CATEGORY_PATHS: [&str; 3] = [
    "/shop/roofing/shingles",
    "/shop/roofing/underlayment",
    "/shop/roofing/accessories",
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

/// Scraper implementation for ABC Supply roofing categories
pub struct AbcSupplyScraper {
    scraper: Scraper,
    config: ScraperConfig,
}

impl AbcSupplyScraper {
    pub fn new(scraper: Scraper) -> Self {
        Self::with_base_url(scraper, BASE_URL)
    }

    /// Creates a scraper against another host (for testing).
    pub fn with_base_url(scraper: Scraper, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let config = ScraperConfig {
            name: SUPPLIER_NAME.to_string(),
            url_pattern: format!("{base_url}{{query}}"),
            targets: strings(&CATEGORY_PATHS),
            selectors: SiteSelectors {
                product_container: strings(&[".product-card", ".product-item", "[data-product]"]),
                name: strings(&[".product-name", ".title", "h3", "h4"]),
                price: strings(&[".price", ".product-price", "[data-price]"]),
                sku: strings(&[".sku", "[data-sku]"]),
                sku_attributes: strings(&["data-product-id"]),
                image: strings(&["img"]),
                link: strings(&["a"]),
            },
            category: "Roofing".to_string(),
            unit: "Each".to_string(),
            fallback_url: Some(format!("{base_url}/shop/roofing")),
            base_url,
        };

        Self { scraper, config }
    }
}

#[async_trait]
impl SupplierScraper for AbcSupplyScraper {
    fn config(&self) -> &ScraperConfig {
        &self.config
    }

    async fn scrape(&self) -> Result<Vec<Listing>> {
        info!(
            "Scraping {} across {} categories",
            self.config.name,
            self.config.targets.len()
        );

        let urls: Vec<String> = self
            .config
            .targets
            .iter()
            .map(|path| self.target_url(path))
            .collect();

        self.scraper.scrape_targets(&self.config, &urls).await
    }

    /// Category targets are paths, not search terms.
    fn target_url(&self, path: &str) -> String {
        self.config.url_pattern.replace("{query}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperSettings;

    #[test]
    fn category_urls_keep_paths() {
        let scraper = AbcSupplyScraper::with_base_url(
            Scraper::new(&ScraperSettings::default()).unwrap(),
            "http://127.0.0.1:9999/",
        );
        assert_eq!(
            scraper.target_url("/shop/roofing/shingles"),
            "http://127.0.0.1:9999/shop/roofing/shingles"
        );
        assert_eq!(
            scraper.config().fallback_url.as_deref(),
            Some("http://127.0.0.1:9999/shop/roofing")
        );
    }
}
