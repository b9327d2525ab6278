use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use roofsource::ai::LlmClient;
use roofsource::api::{AppState, router};
use roofsource::config::LlmSettings;
use roofsource::models::{Listing, NATIONAL};
use roofsource::seed::seed_sample_data;
use roofsource::traits::{ScraperConfig, SiteSelectors, SupplierScraper};
use roofsource::{Database, ScrapeRunner};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Supplier that takes a while and finds nothing.
struct SlowScraper {
    config: ScraperConfig,
}

impl SlowScraper {
    fn new() -> Self {
        Self {
            config: ScraperConfig {
                name: "Slow Supply".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
                url_pattern: String::new(),
                targets: vec![],
                selectors: SiteSelectors::default(),
                category: "Roofing".to_string(),
                unit: "Each".to_string(),
                fallback_url: None,
            },
        }
    }
}

#[async_trait]
impl SupplierScraper for SlowScraper {
    fn config(&self) -> &ScraperConfig {
        &self.config
    }

    async fn scrape(&self) -> Result<Vec<Listing>> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(vec![])
    }
}

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    seed_sample_data(&db).await.unwrap();

    let runner = ScrapeRunner::new(db.clone(), vec![Box::new(SlowScraper::new())], NATIONAL.to_string());
    let llm = LlmClient::new(&LlmSettings::default()).unwrap();

    router(AppState {
        db,
        runner,
        llm: Arc::new(llm),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn search_requires_three_characters() {
    let app = app().await;

    let (status, body) = get(&app, "/api/products/search?q=oc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query must be at least 3 characters");

    let (status, _) = get(&app, "/api/products/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/products/search?q=shingles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 4);
    assert!(body["products"][0]["sku"].is_string());
}

#[tokio::test]
async fn prices_for_sku_sorted_and_404_when_missing() {
    let app = app().await;

    let (status, body) = get(&app, "/api/products/OC-DUR-DRIFT/prices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["manufacturer"], "Owens Corning");
    let prices = body["prices"].as_array().unwrap();
    assert_eq!(prices.len(), 3);
    assert_eq!(prices[0]["supplier"], "Beacon");
    assert_eq!(prices[0]["price"], 112.25);
    assert_eq!(prices[0]["inStock"], true);

    // National prices answer every location
    let (status, body) = get(&app, "/api/products/OC-DUR-DRIFT/prices?location=Toledo,%20OH").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prices"].as_array().unwrap().len(), 3);

    let (status, body) = get(&app, "/api/products/NOPE-123/prices").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn bulk_prices_mark_missing_skus() {
    let app = app().await;
    let request = json!({
        "products": [
            { "sku": "GAF-TIGER-PAWS", "quantity": 6 },
            { "sku": "MISSING-SKU" }
        ]
    });

    let (status, body) = post(&app, "/api/products/prices", &request).await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["found"], true);
    assert_eq!(results[0]["quantity"], 6.0);
    assert_eq!(results[0]["bestPrice"]["price"], 48.0);
    assert_eq!(results[0]["allPrices"].as_array().unwrap().len(), 2);
    assert_eq!(results[1]["found"], false);
    assert_eq!(results[1]["quantity"], 1.0);
    assert!(results[1]["bestPrice"].is_null());

    let (status, body) = post(&app, "/api/products/prices", &json!({ "products": "GAF" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn second_scrape_request_conflicts() {
    let app = app().await;

    let (status, body) = post(&app, "/api/scrape/run", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Scraping job started in background");

    let (status, body) = post(&app, "/api/scrape/run", &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A scrape is already running");

    // Let the background run record its job
    tokio::time::sleep(Duration::from_millis(100)).await;
    let (status, body) = get(&app, "/api/scrape/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], true);
    assert_eq!(body["jobs"][0]["status"], "running");
}

#[tokio::test]
async fn supplier_locations_filter_by_supplier() {
    let app = app().await;

    let (_, all) = get(&app, "/api/suppliers/locations").await;
    assert_eq!(all["count"], 4);

    let (status, abc) = get(&app, "/api/suppliers/locations?supplier=ABC%20Supply").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(abc["count"], 2);
    assert_eq!(abc["locations"][0]["supplierName"], "ABC Supply");
}

#[tokio::test]
async fn compare_returns_quotes_and_variance() {
    let app = app().await;
    let request = json!({
        "scope": [
            { "id": "OC-DUR-DRIFT", "qty": 30 },
            { "id": "IWS-ROLL", "qty": 4 }
        ],
        "vendors": [
            { "id": "abc", "name": "ABC Supply", "pricing": { "OC-DUR-DRIFT": 115.5, "IWS-ROLL": 65 }, "taxRate": 0.07, "deliveryFee": 75 },
            { "id": "hd", "name": "Home Depot Pro", "pricing": { "OC-DUR-DRIFT": 160 } }
        ]
    });

    let (status, body) = post(&app, "/api/quotes/compare", &request).await;
    assert_eq!(status, StatusCode::OK);

    let quotes = body["quotes"].as_array().unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0]["completeness"], 100);
    assert_eq!(quotes[0]["subtotal"], 3725.0);
    assert_eq!(quotes[1]["completeness"], 50);
    assert_eq!(quotes[1]["lineItems"][1]["missingPrice"], true);

    let alerts = body["variance"]["alerts"].as_array().unwrap();
    // Both shingle prices sit about 16% from their average; hd's missing ice & water
    // price is a -100% variance and a zero-price alert
    assert_eq!(alerts.len(), 4);
    assert!(alerts.iter().any(|a| a["vendorId"] == "hd" && a["itemId"] == "IWS-ROLL" && a["severity"] == "high"));
    assert!(alerts.iter().any(|a| a["vendorId"] == "hd" && a["severity"] == "medium"));
    assert!(alerts.iter().any(|a| a["type"] == "zero-price" && a["severity"] == "critical"));
}

#[tokio::test]
async fn rank_and_assemble_sort_vendors() {
    let app = app().await;
    let offers = json!([
        { "supplierName": "ABC Supply", "totalCost": 4800, "inStock": false, "estimatedDeliveryDays": 4,
          "leadTimeDays": 5, "reputation": 92, "serviceRating": 4.6, "branchDistance": 5, "quantityAvailable": 0 },
        { "supplierName": "Home Depot Pro", "totalCost": 5200, "inStock": true, "estimatedDeliveryDays": 1,
          "reputation": 85, "serviceRating": 4.1, "branchDistance": 12, "quantityAvailable": 300 }
    ]);

    let (status, body) = post(
        &app,
        "/api/quotes/rank",
        &json!({ "offers": offers, "context": { "urgency": "urgent", "quantity": 30 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let vendors = body["vendors"].as_array().unwrap();
    assert_eq!(vendors.len(), 2);
    assert!(vendors[0]["intelligenceScore"].as_f64() >= vendors[1]["intelligenceScore"].as_f64());
    assert!(vendors[0]["recommendation"]["level"].is_string());

    let (status, body) = post(
        &app,
        "/api/quotes/assemble",
        &json!({ "materials": [{ "material": "Shingles", "offers": offers }, { "material": "Nails", "offers": [] }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalItems"], 2);
    assert!(body["materials"][1]["bestVendor"].is_null());
    assert_eq!(body["materials"][0]["allOptions"].as_array().unwrap().len(), 2);

    let (status, _) = post(&app, "/api/quotes/rank", &json!({ "context": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ai_endpoints_work_offline() {
    let app = app().await;

    let (status, body) = post(
        &app,
        "/api/ai/parse-quote",
        &json!({ "text": "Duration Driftwood 40 sq $115.00\nIce & Water 4 rolls $65" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "Heuristic");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (status, body) = post(&app, "/api/ai/identify-product", &json!({ "sku": "OC-DUR-DRIFT" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["confidence"], 100);

    let (status, _) = post(&app, "/api/ai/identify-product", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app, "/api/ai/price-discovery", &json!({ "material": "Synthetic Underlayment" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pricing"]["priceRange"]["average"], 45.0);
}
