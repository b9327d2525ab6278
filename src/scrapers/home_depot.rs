//! Home Depot Pro search-page scraper

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::Listing;
use crate::scraper::Scraper;
use crate::traits::{ScraperConfig, SiteSelectors, SupplierScraper};

pub const SUPPLIER_NAME: &str = "Home Depot Pro";
pub const BASE_URL: &str = "https://www.homedepot.com";

const SEARCH_TERMS: [&str; 7] = [
    "roofing shingles",
    "roof underlayment",
    "ice water shield",
    "drip edge",
    "roofing nails",
    "hip ridge shingles",
    "roof ventilation",
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

/// Scraper implementation for Home Depot search results
pub struct HomeDepotScraper {
    scraper: Scraper,
    config: ScraperConfig,
}

impl HomeDepotScraper {
    pub fn new(scraper: Scraper) -> Self {
        Self::with_base_url(scraper, BASE_URL)
    }

    /// Creates a scraper against another host (for testing).
    pub fn with_base_url(scraper: Scraper, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let config = ScraperConfig {
            name: SUPPLIER_NAME.to_string(),
            url_pattern: format!("{base_url}/s/{{query}}"),
            targets: strings(&SEARCH_TERMS),
            selectors: SiteSelectors {
                product_container: strings(&[".product-pod", "[data-pod-type='product']", "[data-product-id]"]),
                name: strings(&[".product-header__title", ".product-pod__title", ".product-title"]),
                price: strings(&[".price__numbers", ".price"]),
                sku: strings(&["[data-sku]"]),
                sku_attributes: strings(&["data-product-id"]),
                image: strings(&["img"]),
                link: strings(&["a"]),
            },
            category: "Roofing".to_string(),
            unit: "Each".to_string(),
            fallback_url: Some(format!("{base_url}/b/Building-Materials-Roofing/N-5yc1vZaq7q")),
            base_url,
        };

        Self { scraper, config }
    }
}

#[async_trait]
impl SupplierScraper for HomeDepotScraper {
    fn config(&self) -> &ScraperConfig {
        &self.config
    }

    async fn scrape(&self) -> Result<Vec<Listing>> {
        info!(
            "Searching {} with {} search terms",
            self.config.name,
            self.config.targets.len()
        );

        let urls: Vec<String> = self
            .config
            .targets
            .iter()
            .map(|term| self.target_url(term))
            .collect();

        self.scraper.scrape_targets(&self.config, &urls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperSettings;

    #[test]
    fn search_urls_are_encoded() {
        let scraper = HomeDepotScraper::new(Scraper::new(&ScraperSettings::default()).unwrap());
        assert_eq!(
            scraper.target_url("ice water shield"),
            "https://www.homedepot.com/s/ice%20water%20shield"
        );
        assert_eq!(scraper.name(), SUPPLIER_NAME);
        assert_eq!(scraper.config().targets.len(), 7);
    }
}
