// ABOUTME: Binary entry point for the Flow Catalyst execution service
// ABOUTME: Initializes logging, loads configuration, connects storage, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use tracing::info;
use tracing_subscriber::EnvFilter;

use flow_catalyst_server::config::environment::ServerConfig;
use flow_catalyst_server::database::Database;
use flow_catalyst_server::errors::AppResult;
use flow_catalyst_server::server::{self, ServerResources};

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        provider = config.llm.provider.as_str(),
        model = %config.llm.model,
        port = config.http_port,
        "starting Flow Catalyst server"
    );

    let database = Database::new(&config.database_url).await?;
    let resources = ServerResources::new(database, config);

    server::serve(resources).await
}
