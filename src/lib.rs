// ABOUTME: Main library entry point for the Flow Catalyst execution service
// ABOUTME: Provides prompt templating, multi-provider LLM dispatch, and run orchestration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

#![deny(unsafe_code)]

//! # Flow Catalyst Server
//!
//! Backend for the Flow Catalyst mobile client. Runs templated AI-coaching
//! prompts ("catalysts") against a configurable upstream LLM provider and
//! records execution history.
//!
//! ## Architecture
//!
//! - **Templating**: single-pass placeholder substitution with profile
//!   context and a fixed formatting directive
//! - **Providers**: uniform `generate` interface over OpenRouter, OpenAI,
//!   Anthropic, and Gemini completion APIs
//! - **Auth**: JWT verification with an explicitly gated unverified-decode
//!   fallback for local development
//! - **Quota**: per-user daily run limit on UTC calendar-day boundaries
//! - **Routes**: Axum HTTP surface (run, catalyst CRUD, profile, history,
//!   refine)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flow_catalyst_server::config::environment::ServerConfig;
//! use flow_catalyst_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Flow Catalyst server configured with port: {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Identity resolution (JWT verification and dev-only fallback decoding)
pub mod auth;

/// Built-in coach catalog for the anonymous run path
pub mod builtin;

/// Configuration management from environment variables
pub mod config;

/// Database access layer (catalysts, profiles, run history)
pub mod database;

/// Application error taxonomy and HTTP response mapping
pub mod errors;

/// Common data models (catalysts, profiles, runs)
pub mod models;

/// Upstream LLM provider adapters
pub mod providers;

/// Per-user daily run quota enforcement
pub mod quota;

/// HTTP routes organized by domain
pub mod routes;

/// Shared server resources and HTTP server assembly
pub mod server;

/// Prompt template rendering
pub mod templating;
