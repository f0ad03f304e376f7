mod api;
mod catalog;
mod config;
mod db;
mod error;
mod planner;
mod rules;
mod shaper;
mod types;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::latency::LatencyRegistry;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::planner::CohortPlanner;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = db::pool::connect(&cfg).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!(
        database_url = %cfg.database_url,
        max_connections = cfg.db_max_connections,
        "Database ready"
    );

    // --- HTTP API server ---
    let state = ApiState {
        planner: CohortPlanner::new(pool.clone(), cfg.query_timeout),
        latency: Arc::new(LatencyRegistry::new()),
    };
    let app = router(state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
