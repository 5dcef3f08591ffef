// ABOUTME: Route module organization for the Flow Catalyst HTTP surface
// ABOUTME: One module per domain with thin handlers delegating to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! HTTP routes
//!
//! Each domain module exposes a `Routes` struct with a `routes()` constructor
//! returning an Axum router over `Arc<ServerResources>`.

/// Catalyst CRUD endpoints
pub mod catalysts;

/// Health check endpoint
pub mod health;

/// Profile read/upsert endpoints
pub mod profiles;

/// Refine and refine-coach endpoints
pub mod refine;

/// Run execution and history endpoints
pub mod runs;

pub use catalysts::CatalystRoutes;
pub use health::HealthRoutes;
pub use profiles::ProfileRoutes;
pub use refine::RefineRoutes;
pub use runs::RunRoutes;
