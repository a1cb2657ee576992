// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridCast.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod config;

use anyhow::Result;
use gridcast_store::StoreClient;
use gridcast_web::{AppState, start_web_server};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle command line arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" => {
                println!("GridCast - Ontario demand forecast API");
                println!("Version: {}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Usage: gridcast [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help    Print this help message");
                println!("  -v, --version Print version");
                return Ok(());
            }
            "--version" | "-v" => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            _ => {}
        }
    }

    // Initialize tracing with env filter support
    // Respects RUST_LOG environment variable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = config::load_config()?;
    let credentials = config.store.credentials();

    info!("🚀 Starting GridCast - Ontario demand forecast API");
    info!("📋 Configuration Summary:");
    info!("   Bucket: {}", config.store.bucket);
    info!("   Region: {}", config.store.region);
    info!("   Endpoint: {}", config.store.endpoint());
    info!(
        "   Credentials: {}",
        if credentials.is_some() {
            "configured"
        } else {
            "anonymous"
        }
    );
    info!(
        "   Bind: {}:{}",
        config.server.bind_address, config.server.port
    );

    let store = StoreClient::new(
        config.store.endpoint(),
        &config.store.region,
        &config.store.bucket,
        credentials,
    )?;
    let state = AppState {
        store: Arc::new(store),
    };

    if let Err(e) = start_web_server(state, &config.server.bind_address, config.server.port).await {
        tracing::error!("❌ Web server failed: {}", e);
        anyhow::bail!("web server failed: {e}");
    }

    Ok(())
}
