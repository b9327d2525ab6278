//! roofsource - roofing supplier price scraper, price API and quote tools

pub mod ai;
pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod jobs;
pub mod models;
pub mod quote;
pub mod ranking;
pub mod scraper;
pub mod scrapers;
pub mod seed;
pub mod traits;

pub use config::AppConfig;
pub use database::Database;
pub use jobs::ScrapeRunner;
