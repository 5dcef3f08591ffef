// ABOUTME: Shared server resources and HTTP server assembly
// ABOUTME: Wires database, auth resolver, quota guard, and provider into one Axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Server assembly
//!
//! [`ServerResources`] is the single shared-state struct handed to every
//! route handler. Requests are independent and stateless; nothing here is
//! mutated after startup.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthResolver;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::providers::{HttpTextProvider, TextProvider};
use crate::quota::QuotaGuard;
use crate::routes::{
    catalysts::CatalystRoutes, health::HealthRoutes, profiles::ProfileRoutes,
    refine::RefineRoutes, runs::RunRoutes,
};

/// Shared, read-only resources for all request handlers
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Bearer-token identity resolution
    pub auth: AuthResolver,
    /// Daily run quota enforcement
    pub quota: QuotaGuard,
    /// Upstream LLM dispatch
    pub provider: Arc<dyn TextProvider>,
    /// Full server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Build resources with the HTTP-backed provider from configuration
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Arc<Self> {
        let provider: Arc<dyn TextProvider> = Arc::new(HttpTextProvider::new(config.llm.clone()));
        Self::with_provider(database, config, provider)
    }

    /// Build resources with an explicit provider (tests inject mocks here)
    #[must_use]
    pub fn with_provider(
        database: Database,
        config: ServerConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            database,
            auth: AuthResolver::new(&config.auth),
            quota: QuotaGuard::new(&config.quota),
            provider,
            config,
        })
    }
}

/// Assemble the full application router
///
/// Every response carries `Access-Control-Allow-Origin: *`; the CORS layer
/// also answers `OPTIONS` pre-flight requests.
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(RunRoutes::routes(resources.clone()))
        .merge(CatalystRoutes::routes(resources.clone()))
        .merge(ProfileRoutes::routes(resources.clone()))
        .merge(RefineRoutes::routes(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until shutdown
///
/// # Errors
/// Returns an error when binding or serving fails.
pub async fn serve(resources: Arc<ServerResources>) -> AppResult<()> {
    let port = resources.config.http_port;
    let app = router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| AppError::internal(format!("failed to bind port {port}: {e}")))?;

    info!("Flow Catalyst server listening on port {port}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("server error: {e}")))
}
