use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roofsource::ai::LlmClient;
use roofsource::api::{self, AppState};
use roofsource::scrapers::build_scrapers;
use roofsource::seed::seed_sample_data;
use roofsource::{AppConfig, Database, ScrapeRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "roofsource",
    version,
    about = "Roofing supplier price scraper and quote comparison API"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API and the scheduled scrape
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not schedule scrapes
        #[arg(long)]
        no_schedule: bool,
    },

    /// Run every enabled supplier scraper once
    Scrape,

    /// Load the sample catalog
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = AppConfig::load(cli.config.as_deref())?.with_env();

    let database = Database::connect(&config.database.url).await?;
    let scrapers = build_scrapers(&config.scraper)?;
    let runner = ScrapeRunner::new(database.clone(), scrapers, config.scraper.location.clone());

    match cli.command {
        Commands::Serve {
            host,
            port,
            no_schedule,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            // Held for the lifetime of the server
            let _scheduler = match config.scraper.schedule.as_deref() {
                Some(schedule) if !no_schedule => Some(runner.schedule(schedule).await?),
                _ => None,
            };

            let state = AppState {
                db: database,
                runner,
                llm: Arc::new(LlmClient::new(&config.llm)?),
            };
            let app = api::router(state).layer(ServiceBuilder::new());

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;

            info!("RoofSource API listening on {}", addr);
            info!("  GET  /api/products/search?q=shingles");
            info!("  GET  /api/products/:sku/prices");
            info!("  POST /api/products/prices");
            info!("  POST /api/scrape/run");
            axum::serve(listener, app).await?;
        }

        Commands::Scrape => {
            let summary = runner.run_all().await?;
            println!("Stored {} products", summary.total);
            for (supplier, count) in &summary.by_supplier {
                println!("  {supplier:<16} {count}");
            }
            for supplier in &summary.failed {
                println!("  {supplier:<16} failed");
            }
        }

        Commands::Seed => {
            let summary = seed_sample_data(&database).await?;
            println!(
                "Added {} products with {} price points and {} branches",
                summary.products, summary.prices, summary.branches
            );
        }
    }

    Ok(())
}
