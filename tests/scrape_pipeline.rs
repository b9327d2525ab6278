use roofsource::config::ScraperSettings;
use roofsource::models::{NATIONAL, ScrapeStatus};
use roofsource::scraper::Scraper;
use roofsource::scrapers::{AbcSupplyScraper, HomeDepotScraper};
use roofsource::traits::SupplierScraper;
use roofsource::{Database, ScrapeRunner};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME_DEPOT_PAGE: &str = include_str!("fixtures/home_depot_search.html");
const ABC_PAGE: &str = include_str!("fixtures/abc_category.html");

fn fast_scraper() -> Scraper {
    Scraper::new(&ScraperSettings {
        delay_ms: 0,
        delay_jitter_ms: 0,
        ..ScraperSettings::default()
    })
    .unwrap()
}

async fn mount_page(server: &MockServer, pattern: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path_regex(pattern))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn scrapers(base_url: &str) -> Vec<Box<dyn SupplierScraper>> {
    vec![
        Box::new(AbcSupplyScraper::with_base_url(fast_scraper(), base_url)),
        Box::new(HomeDepotScraper::with_base_url(fast_scraper(), base_url)),
    ]
}

#[tokio::test]
async fn home_depot_search_pages_yield_unique_listings() {
    let server = MockServer::start().await;
    mount_page(&server, "^/s/", 200, HOME_DEPOT_PAGE).await;

    let scraper = HomeDepotScraper::with_base_url(fast_scraper(), &server.uri());
    let listings = scraper.scrape().await.unwrap();

    // Same page for all seven terms; the unpriced and SKU-less pods are skipped
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].sku, "100537521");
    assert_eq!(listings[0].price, 1139.0);
    assert_eq!(
        listings[0].image_url.as_deref(),
        Some("https://images.thdstatic.com/productImages/100537521.jpg")
    );
    assert_eq!(listings[1].sku, "202071234");
    assert_eq!(listings[1].price, 42.97);
    assert_eq!(
        listings[1].url.as_deref(),
        Some(format!("{}/p/GAF-Timberline-HDZ-Charcoal-Architectural-Shingles/202071234", server.uri()).as_str())
    );
    assert_eq!(
        listings[1].image_url.as_deref(),
        Some("https://images.thdstatic.com/productImages/202071234.jpg")
    );
}

#[tokio::test]
async fn abc_category_pages_use_fallback_selectors() {
    let server = MockServer::start().await;
    mount_page(&server, "^/shop/roofing/", 200, ABC_PAGE).await;

    let scraper = AbcSupplyScraper::with_base_url(fast_scraper(), &server.uri());
    let listings = scraper.scrape().await.unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].sku, "CT-LANDMARK-MOIRE");
    assert_eq!(listings[0].name, "CertainTeed Landmark Shingles - Moire Black");
    assert_eq!(listings[0].price, 118.0);
    assert_eq!(listings[1].sku, "OC-DUR-ONYX");
    assert_eq!(
        listings[1].image_url.as_deref(),
        Some(format!("{}/media/catalog/oc-duration-onyx.png", server.uri()).as_str())
    );
}

#[tokio::test]
async fn runner_stores_listings_and_logs_jobs() {
    let server = MockServer::start().await;
    mount_page(&server, "^/s/", 200, HOME_DEPOT_PAGE).await;
    mount_page(&server, "^/shop/roofing/", 200, ABC_PAGE).await;

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let runner = ScrapeRunner::new(db.clone(), scrapers(&server.uri()), NATIONAL.to_string());

    let summary = runner.run_all().await.unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.by_supplier["ABC Supply"], 2);
    assert_eq!(summary.by_supplier["Home Depot Pro"], 2);
    assert!(summary.failed.is_empty());

    let onyx = db.get_product_by_sku("OC-DUR-ONYX").await.unwrap().unwrap();
    assert_eq!(onyx.manufacturer.as_deref(), Some("Owens Corning"));

    let prices = db.get_prices_for_product("OC-DUR-ONYX").await.unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].supplier_name, "ABC Supply");
    assert_eq!(prices[0].price, 115.5);
    assert_eq!(prices[0].location, NATIONAL);

    let jobs = db.recent_scrape_jobs(10).await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|job| job.status == ScrapeStatus::Completed));
    assert!(jobs.iter().all(|job| job.products_found == 2));

    // A second run refreshes rows instead of duplicating them
    runner.run_all().await.unwrap();
    assert_eq!(db.get_prices_for_product("OC-DUR-ONYX").await.unwrap().len(), 1);
    assert_eq!(db.search_products("Shingles").await.unwrap().len(), 4);
}

#[tokio::test]
async fn failing_supplier_is_logged_and_others_continue() {
    let server = MockServer::start().await;
    mount_page(&server, "^/s/", 200, HOME_DEPOT_PAGE).await;
    mount_page(&server, "^/shop/roofing/", 503, "").await;

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let runner = ScrapeRunner::new(db.clone(), scrapers(&server.uri()), NATIONAL.to_string());

    let summary = runner.run_all().await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, vec!["ABC Supply".to_string()]);

    let jobs = db.recent_scrape_jobs(10).await.unwrap();
    let abc = jobs.iter().find(|job| job.supplier_name == "ABC Supply").unwrap();
    assert_eq!(abc.status, ScrapeStatus::Failed);
    assert!(abc.errors.as_deref().unwrap().contains("Every ABC Supply page failed"));
    assert!(abc.completed_at.is_some());
}
