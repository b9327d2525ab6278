use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::{
    NewPrice, NewProduct, NewSupplierLocation, PriceRow, Product, ScrapeJob, ScrapeStatus,
    SupplierLocation,
};

/// Maximum rows returned by a product search.
pub const SEARCH_LIMIT: i64 = 50;

const PRICE_SELECT: &str = r"
    SELECT sp.id, sp.product_id, sp.supplier_name, sp.supplier_sku, sp.price, sp.unit,
           sp.in_stock, sp.stock_quantity, sp.location, sp.url, sp.scraped_at,
           p.sku, p.name, p.manufacturer
    FROM supplier_prices sp
    JOIN products p ON sp.product_id = p.id
";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database at `url`, creating the file if needed, and runs migrations.
    ///
    /// The pool holds a single connection; this also keeps `sqlite::memory:`
    /// databases alive for the lifetime of the pool.
    pub async fn connect(url: &str) -> Result<Self> {
        ensure_parent_dir(url)?;

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url: {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {url}"))?;

        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Database initialized successfully");
        Ok(Self { pool })
    }

    /// Inserts a product or refreshes the existing row with the same SKU.
    /// Returns the product id.
    pub async fn upsert_product(&self, product: &NewProduct) -> Result<i64> {
        let now = Utc::now();
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO products (sku, name, manufacturer, category, description, image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(sku) DO UPDATE SET
                name = excluded.name,
                manufacturer = COALESCE(excluded.manufacturer, products.manufacturer),
                category = COALESCE(excluded.category, products.category),
                description = COALESCE(excluded.description, products.description),
                image_url = COALESCE(excluded.image_url, products.image_url),
                updated_at = excluded.updated_at
            RETURNING id
            ",
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.manufacturer)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert product {}", product.sku))?;

        Ok(id)
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = ?")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Products whose name, SKU or manufacturer contains `term`.
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let pattern = format!("%{term}%");
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT * FROM products
            WHERE name LIKE ? OR sku LIKE ? OR manufacturer LIKE ?
            ORDER BY name
            LIMIT ?
            ",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        debug!("Search '{}' matched {} products", term, products.len());
        Ok(products)
    }

    /// Inserts a price or replaces the one already stored for the same
    /// product, supplier and location.
    pub async fn upsert_price(&self, price: &NewPrice) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO supplier_prices
                (product_id, supplier_name, supplier_sku, price, unit, in_stock, stock_quantity, location, url, scraped_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(product_id, supplier_name, location) DO UPDATE SET
                supplier_sku = excluded.supplier_sku,
                price = excluded.price,
                unit = excluded.unit,
                in_stock = excluded.in_stock,
                stock_quantity = excluded.stock_quantity,
                url = excluded.url,
                scraped_at = excluded.scraped_at
            ",
        )
        .bind(price.product_id)
        .bind(&price.supplier_name)
        .bind(&price.supplier_sku)
        .bind(price.price)
        .bind(&price.unit)
        .bind(price.in_stock)
        .bind(price.stock_quantity)
        .bind(&price.location)
        .bind(&price.url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to upsert {} price for product {}",
                price.supplier_name, price.product_id
            )
        })?;

        Ok(())
    }

    /// All stored prices for a SKU, cheapest first.
    pub async fn get_prices_for_product(&self, sku: &str) -> Result<Vec<PriceRow>> {
        let query = format!("{PRICE_SELECT} WHERE p.sku = ? ORDER BY sp.price ASC");
        let rows = sqlx::query_as::<_, PriceRow>(&query)
            .bind(sku)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Prices for a SKU at `location` plus national prices, cheapest first.
    pub async fn get_prices_by_location(&self, location: &str, sku: &str) -> Result<Vec<PriceRow>> {
        let query = format!(
            "{PRICE_SELECT} WHERE (sp.location = ? OR sp.location = ?) AND p.sku = ? ORDER BY sp.price ASC"
        );
        let rows = sqlx::query_as::<_, PriceRow>(&query)
            .bind(location)
            .bind(crate::models::NATIONAL)
            .bind(sku)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Records the start of a scrape and returns the job id.
    pub async fn insert_scrape_job(&self, supplier_name: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO scrape_jobs (supplier_name, status, started_at) VALUES (?, ?, ?)",
        )
        .bind(supplier_name)
        .bind(ScrapeStatus::Running)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn complete_scrape_job(&self, job_id: i64, products_found: i64) -> Result<()> {
        self.finish_scrape_job(job_id, ScrapeStatus::Completed, products_found, None)
            .await
    }

    pub async fn fail_scrape_job(&self, job_id: i64, error: &str) -> Result<()> {
        self.finish_scrape_job(job_id, ScrapeStatus::Failed, 0, Some(error))
            .await
    }

    async fn finish_scrape_job(
        &self,
        job_id: i64,
        status: ScrapeStatus,
        products_found: i64,
        errors: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE scrape_jobs
            SET status = ?, products_found = ?, errors = ?, completed_at = ?
            WHERE id = ?
            ",
        )
        .bind(status)
        .bind(products_found)
        .bind(errors)
        .bind(Utc::now())
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_scrape_job(&self, job_id: i64) -> Result<Option<ScrapeJob>> {
        let job = sqlx::query_as::<_, ScrapeJob>("SELECT * FROM scrape_jobs WHERE id = ?")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    /// Most recent scrape jobs first.
    pub async fn recent_scrape_jobs(&self, limit: i64) -> Result<Vec<ScrapeJob>> {
        let jobs = sqlx::query_as::<_, ScrapeJob>(
            "SELECT * FROM scrape_jobs ORDER BY started_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    /// Inserts a branch or refreshes the one with the same supplier, city and state.
    pub async fn upsert_supplier_location(&self, location: &NewSupplierLocation) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO supplier_locations
                (supplier_name, address, city, state, zip, phone, latitude, longitude, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(supplier_name, city, state) DO UPDATE SET
                address = excluded.address,
                zip = excluded.zip,
                phone = excluded.phone,
                latitude = excluded.latitude,
                longitude = excluded.longitude
            RETURNING id
            ",
        )
        .bind(&location.supplier_name)
        .bind(&location.address)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.zip)
        .bind(&location.phone)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Branches, optionally restricted to one supplier.
    pub async fn supplier_locations(&self, supplier: Option<&str>) -> Result<Vec<SupplierLocation>> {
        let locations = match supplier {
            Some(name) => {
                sqlx::query_as::<_, SupplierLocation>(
                    "SELECT * FROM supplier_locations WHERE supplier_name = ? ORDER BY state, city",
                )
                .bind(name)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SupplierLocation>(
                    "SELECT * FROM supplier_locations ORDER BY supplier_name, state, city",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(locations)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

/// Creates the directory holding a file-backed SQLite database.
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!("Creating database directory {}", parent.display());
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Ok(())
}
