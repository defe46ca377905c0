mod config;
mod db;
mod error;
mod http;
mod models;
mod services;
mod utils;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::http::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let database = db::Database::new(config.database_path.clone())?;
    let state = AppState::new(database, config.clone());

    if std::env::args().nth(1).as_deref() == Some("seed") {
        let count = std::env::args()
            .nth(2)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);
        let seeded = services::invoices::seed(&state.db, &config, count)?;
        tracing::info!(count = seeded, "seeded demo invoices");
        return Ok(());
    }

    let app = build_router(state);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "invoice service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
