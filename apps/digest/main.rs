#![warn(unused_extern_crates)]

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use dotenv::dotenv;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};
use utils::{errors, tracing::run_with_tracing};

mod config;
mod digest;
mod subgraph;

#[tokio::main]
async fn main() {
    dotenv().ok();
    run_with_tracing(run).await;
}

async fn run() -> Result<()> {
    info!("Digest service starting up");

    config::load()?;

    let app = Router::new().route("/health", get(|| async { "OK" }));
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .context(errors::HEALTH_BIND_FAILED)?;
    let addr = listener.local_addr().context(errors::HEALTH_BIND_FAILED)?;

    let health_server_handle = tokio::spawn(async move {
        info!(address = %addr, "Health check server listening");
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Health check server failed");
        }
    });

    let digest_handle = tokio::spawn(async move {
        let interval = config::get_config().poll_interval_secs;
        loop {
            info!("Running digest task");
            if let Err(e) = digest::run_digest_task().await {
                error!(error = %e, "Digest task failed");
            }
            info!("Digest task completed, sleeping for {} seconds", interval);
            sleep(Duration::from_secs(interval)).await;
        }
    });

    info!("All tasks started, application running indefinitely");

    tokio::select! {
        res = health_server_handle => {
            error!("Health server task completed unexpectedly: {:?}", res);
        }
        res = digest_handle => {
            error!("Digest task completed unexpectedly: {:?}", res);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
    }

    info!("Application shutting down");
    Ok(())
}
