// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Context;
use clap::Parser;
use gig_guide::app::{create_router, AppState, VERSION};
use gig_guide::services::delivery::{DeliveryClient, DeliveryConfig};
use gig_guide::services::logging::init_logging;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gig-guide")]
#[command(version)]
#[command(about = "Artist and venue search backed by the content delivery API", long_about = None)]
struct Cli {
    /// Address to listen on (0.0.0.0 is required inside Docker)
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = DeliveryConfig::from_env().context("Invalid delivery API configuration")?;
    let client = DeliveryClient::new(config).context("Failed to create delivery client")?;
    let app = create_router(AppState::new(Arc::new(client)));

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;

    tracing::info!(version = VERSION, addr = %cli.listen, "gig-guide listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
