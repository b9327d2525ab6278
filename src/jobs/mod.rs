use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::database::Database;
use crate::models::{Listing, NewPrice, NewProduct};
use crate::scraper::price::infer_manufacturer;
use crate::traits::{ScraperConfig, SupplierScraper};

/// Products stored per supplier in one run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSummary {
    pub total: usize,
    pub by_supplier: BTreeMap<String, usize>,
    pub failed: Vec<String>,
}

/// Runs supplier scrapers one after another and logs each run in `scrape_jobs`.
///
/// At most one run is active at a time across clones.
#[derive(Clone)]
pub struct ScrapeRunner {
    database: Database,
    scrapers: Arc<Vec<Box<dyn SupplierScraper>>>,
    location: String,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when a run ends, however it ends.
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl ScrapeRunner {
    pub fn new(database: Database, scrapers: Vec<Box<dyn SupplierScraper>>, location: String) -> Self {
        Self {
            database,
            scrapers: Arc::new(scrapers),
            location,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                running: Arc::clone(&self.running),
            })
    }

    /// Runs every scraper now. Fails if another run is in progress.
    pub async fn run_all(&self) -> Result<ScrapeSummary> {
        let Some(guard) = self.try_acquire() else {
            bail!("A scrape is already running");
        };
        Ok(self.run_with(guard).await)
    }

    /// Starts a run on the runtime and returns immediately.
    /// Returns `false` if a run is already in progress.
    pub fn start_in_background(&self) -> bool {
        let Some(guard) = self.try_acquire() else {
            return false;
        };

        let runner = self.clone();
        tokio::spawn(async move {
            runner.run_with(guard).await;
        });
        true
    }

    async fn run_with(&self, _guard: RunGuard) -> ScrapeSummary {
        info!("Starting scrape of {} suppliers", self.scrapers.len());
        let mut summary = ScrapeSummary::default();

        for scraper in self.scrapers.iter() {
            let name = scraper.name().to_string();
            match self.run_one(scraper.as_ref()).await {
                Ok(count) => {
                    summary.total += count;
                    summary.by_supplier.insert(name, count);
                }
                Err(e) => {
                    error!("{} scrape failed: {:#}", name, e);
                    summary.failed.push(name);
                }
            }
        }

        info!(
            "Scraping complete: {} products stored, {} suppliers failed",
            summary.total,
            summary.failed.len()
        );
        summary
    }

    /// Scrapes one supplier inside a logged job. Returns the stored count.
    async fn run_one(&self, scraper: &dyn SupplierScraper) -> Result<usize> {
        let job_id = self.database.insert_scrape_job(scraper.name()).await?;

        match scraper.scrape().await {
            Ok(listings) => {
                let stored = self.store_listings(scraper.config(), &listings).await;
                let stored_count = i64::try_from(stored).unwrap_or(i64::MAX);
                self.database.complete_scrape_job(job_id, stored_count).await?;
                info!("{}: stored {} of {} listings", scraper.name(), stored, listings.len());
                Ok(stored)
            }
            Err(e) => {
                let message = format!("{e:#}");
                self.database.fail_scrape_job(job_id, &message).await?;
                Err(e)
            }
        }
    }

    /// Upserts each listing; listings that fail are logged and skipped.
    pub async fn store_listings(&self, config: &ScraperConfig, listings: &[Listing]) -> usize {
        let mut stored = 0;

        for listing in listings {
            match self.store_listing(config, listing).await {
                Ok(()) => stored += 1,
                Err(e) => warn!("Error saving {} product {}: {:#}", config.name, listing.sku, e),
            }
        }

        stored
    }

    async fn store_listing(&self, config: &ScraperConfig, listing: &Listing) -> Result<()> {
        let product_id = self
            .database
            .upsert_product(&NewProduct {
                sku: listing.sku.clone(),
                name: listing.name.clone(),
                manufacturer: Some(infer_manufacturer(&listing.name).to_string()),
                category: Some(config.category.clone()),
                description: None,
                image_url: listing.image_url.clone(),
            })
            .await?;

        self.database
            .upsert_price(&NewPrice {
                product_id,
                supplier_name: config.name.clone(),
                supplier_sku: Some(listing.sku.clone()),
                price: listing.price,
                unit: Some(config.unit.clone()),
                in_stock: true,
                stock_quantity: None,
                location: self.location.clone(),
                url: listing.url.clone().or_else(|| config.fallback_url.clone()),
            })
            .await
    }

    /// Registers a cron job that runs every scraper on `schedule`.
    pub async fn schedule(&self, schedule: &str) -> Result<JobScheduler> {
        let sched = JobScheduler::new().await?;

        let runner = self.clone();
        sched
            .add(Job::new_async(schedule, move |_uuid, _l| {
                let runner = runner.clone();
                Box::pin(async move {
                    info!("Running scheduled scrape job");
                    if let Err(e) = runner.run_all().await {
                        warn!("Scheduled scrape skipped: {}", e);
                    }
                })
            })?)
            .await?;

        sched.start().await?;
        info!("Scrape scheduler started ({})", schedule);
        Ok(sched)
    }
}
