pub mod extract;
pub mod price;

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScraperSettings;
use crate::models::Listing;
use crate::traits::ScraperConfig;
use extract::{CompiledSelectors, extract_listings};

const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Shared HTTP fetcher used by every supplier scraper.
pub struct Scraper {
    client: Client,
    user_agents: Vec<String>,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl Scraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(FALLBACK_USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            user_agents: settings.user_agents.clone(),
            delay_ms: settings.delay_ms,
            delay_jitter_ms: settings.delay_jitter_ms,
        })
    }

    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map_or(FALLBACK_USER_AGENT, String::as_str)
    }

    /// Fetches a page and returns its body.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", self.pick_user_agent())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch {}: {}", url, status);
        }

        response.text().await.context("Failed to read response body")
    }

    /// Waits the configured delay plus random jitter.
    pub async fn pause(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total = self.delay_ms + jitter;
        debug!("Delaying {}ms", total);
        tokio::time::sleep(Duration::from_millis(total)).await;
    }

    /// Fetches every target of `config` in order and extracts listings.
    ///
    /// Listings are deduplicated by SKU; a failed page is skipped. Fails only
    /// when every page failed.
    pub async fn scrape_targets(&self, config: &ScraperConfig, urls: &[String]) -> Result<Vec<Listing>> {
        let selectors = CompiledSelectors::compile(&config.selectors)?;
        let mut listings: HashMap<String, Listing> = HashMap::new();
        let mut last_error = None;
        let mut pages_ok = 0;

        for (index, url) in urls.iter().enumerate() {
            if index > 0 {
                self.pause().await;
            }

            info!("Fetching {} page {}/{}: {}", config.name, index + 1, urls.len(), url);

            let html = match self.fetch(url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("{} page failed: {:#}", config.name, e);
                    last_error = Some(e);
                    continue;
                }
            };
            pages_ok += 1;

            let found = extract_listings(&html, &selectors, &config.base_url);
            info!("Found {} listings on {}", found.len(), url);

            for listing in found {
                listings.entry(listing.sku.clone()).or_insert(listing);
            }
        }

        if pages_ok == 0
            && let Some(e) = last_error
        {
            return Err(e.context(format!("Every {} page failed", config.name)));
        }

        let mut listings: Vec<Listing> = listings.into_values().collect();
        listings.sort_by(|a, b| a.sku.cmp(&b.sku));

        info!(
            "Found {} unique listings on {} across {} pages",
            listings.len(),
            config.name,
            pages_ok
        );
        Ok(listings)
    }
}

impl Clone for Scraper {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            user_agents: self.user_agents.clone(),
            delay_ms: self.delay_ms,
            delay_jitter_ms: self.delay_jitter_ms,
        }
    }
}
