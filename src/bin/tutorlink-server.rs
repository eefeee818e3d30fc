// ABOUTME: Server binary for the TutorLink doubt assignment API
// ABOUTME: Loads environment configuration, opens the database and serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![recursion_limit = "256"]

//! # TutorLink API Server Binary
//!
//! Starts the HTTP API with JWT authentication, `SQLite` storage and the
//! optional AI enrichment provider.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tutorlink_server::{
    config::ServerConfig, database::Database, logging::LoggingConfig,
    resources::ServerResources, server,
};

#[derive(Parser)]
#[command(name = "tutorlink-server")]
#[command(about = "TutorLink API - doubt assignment and teacher/student conversations")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting TutorLink API");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    let resources = Arc::new(ServerResources::new(database, config));

    if let Err(e) = server::serve(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
