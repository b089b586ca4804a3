//! Application entry point for the `platescan` backend service.
//!
//! This binary orchestrates the full startup sequence for the food analysis
//! and calorie tracking API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Establishing a PostgreSQL connection pool
//! - Creating the key-value schema if it does not exist
//! - Constructing the upstream HTTP clients and the analysis pipeline
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `VISION_API_KEY`, `RECIPE_API_KEY`, `NUTRITION_APP_ID`,
//!   `NUTRITION_API_KEY` (**required**) – upstream credentials
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `PLATESCAN_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `PLATESCAN_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module follows the Explicit Module Boundary Pattern (EMBP) by
//! delegating schema setup to `schema`, configuration parsing to `config`,
//! and route registration to `routes`.
use std::{env, io::IsTerminal, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod analysis;
mod clients;
mod config;
mod error;
mod goals;
mod ledger;
mod matcher;
mod meals;
mod models;
mod normalize;
mod routes;
mod schema;
mod storage;

use analysis::Analyzer;
use clients::{NutritionApiClient, RecipeApiClient, VisionClient};
use storage::PgKvStore;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    // One shared HTTP client; its timeout is the caller-level abort for any
    // single upstream round-trip.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(u64::from(cfg.upstream_timeout_secs)))
        .build()?;

    let analyzer = Arc::new(Analyzer::new(
        Arc::new(VisionClient::new(
            http.clone(),
            cfg.vision_api_url.clone(),
            cfg.vision_api_key.clone(),
        )),
        Arc::new(RecipeApiClient::new(
            http.clone(),
            cfg.recipe_api_url.clone(),
            cfg.recipe_api_key.clone(),
        )),
        Arc::new(NutritionApiClient::new(
            http,
            cfg.nutrition_api_url.clone(),
            cfg.nutrition_app_id.clone(),
            cfg.nutrition_api_key.clone(),
        )),
        Arc::new(PgKvStore::new(pool)),
    ));

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(analyzer);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `PLATESCAN_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `PLATESCAN_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("PLATESCAN_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to PLATESCAN_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("PLATESCAN_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
