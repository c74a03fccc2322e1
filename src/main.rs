//! # Flight Dashboard Entry Point
//!
//! Serves normalized aircraft data from the local flight feeder to the web
//! dashboard. Two development modes skip the HTTP server:
//!
//! - `--stdout`: fetch once and print an aircraft table
//! - `--json`: fetch once and print the snapshot JSON the dashboard would get

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use flight_dash_lib::{
    cache::AircraftCache,
    config::Config,
    feeder::FeederClient,
    logging,
    renderer::draw_ascii,
    server::{self, AppState},
};
use std::{env, sync::Arc};
use tracing::info;

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    logging::init();

    // Development modes: one fetch, printed, no server
    let table_mode = env::args().any(|arg| arg == "--stdout");
    let json_mode = env::args().any(|arg| arg == "--json");

    let config = Config::load();
    let source = FeederClient::from_config(&config).context("building feeder HTTP client")?;
    let cache = AircraftCache::new(source)
        .with_ttl(config.cache.ttl())
        .with_raw_dump(&config.files.raw_dump_path);

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    if table_mode || json_mode {
        let snapshot = rt.block_on(cache.get(&config.feeder.host));
        if json_mode {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            draw_ascii(&snapshot, config.receiver_position());
        }
        return Ok(());
    }

    info!(
        host = %config.feeder.host,
        ttl_secs = config.cache.ttl_secs,
        "starting flight dashboard"
    );
    let state = Arc::new(AppState::new(cache, config.feeder.host.clone()));
    rt.block_on(server::serve(&config.server.bind, state))
        .with_context(|| format!("serving dashboard API on {}", config.server.bind))?;

    Ok(())
}
