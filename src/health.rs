//! Liveness endpoint
//!
//! Free hosting tiers put a web service to sleep when nothing hits it over
//! HTTP; an external pinger hitting `/health` keeps the bot process awake.

use anyhow::Result;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use log::info;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::features::get_bot_version;

async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "time": Utc::now().to_rfc3339(),
        "version": get_bot_version(),
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

/// Serve the liveness routes on all interfaces until the process exits
pub async fn start_server(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP health server listening on :{port}");

    axum::serve(listener, router()).await?;
    Ok(())
}
