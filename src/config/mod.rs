// ABOUTME: Configuration module organization for the Flow Catalyst server
// ABOUTME: Re-exports the environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Configuration management
//!
//! All configuration is environment-driven; see [`environment::ServerConfig`].

/// Environment variable parsing into typed configuration structs
pub mod environment;

pub use environment::{AuthConfig, LlmConfig, LlmProviderType, QuotaConfig, ServerConfig};
