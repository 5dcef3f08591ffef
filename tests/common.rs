// ABOUTME: Shared test utilities for building server resources and minting tokens
// ABOUTME: Provides in-memory database setup, mock providers, and JWT helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code, missing_docs)]

//! Shared test utilities for `flow_catalyst_server`

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

use flow_catalyst_server::config::environment::{
    AuthConfig, LlmConfig, LlmProviderType, QuotaConfig, ServerConfig,
};
use flow_catalyst_server::database::{CreateCatalystRequest, Database, UpsertProfileRequest};
use flow_catalyst_server::errors::{AppError, AppResult};
use flow_catalyst_server::models::{Catalyst, Plan, Profile};
use flow_catalyst_server::providers::TextProvider;
use flow_catalyst_server::server::ServerResources;

/// Secret shared between test token minting and the verifying resolver
pub const TEST_JWT_SECRET: &str = "flow-catalyst-test-secret";

/// Default daily limit used by test configurations
pub const TEST_DAILY_LIMIT: u32 = 3;

/// Scripted provider behavior for tests
pub enum MockProvider {
    /// Return the prompt itself as the completion
    Echo,
    /// Return a fixed string
    Fixed(String),
    /// Fail with an upstream provider error
    Fail { status: u16, message: String },
}

#[async_trait]
impl TextProvider for MockProvider {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        match self {
            Self::Echo => Ok(prompt.to_owned()),
            Self::Fixed(text) => Ok(text.clone()),
            Self::Fail { status, message } => Err(AppError::UpstreamProvider {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// Test server configuration with the insecure fallback disabled
pub fn test_config() -> ServerConfig {
    test_config_with_fallback(false)
}

/// Test server configuration with an explicit fallback setting
pub fn test_config_with_fallback(allow_insecure_fallback: bool) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        llm: LlmConfig {
            provider: LlmProviderType::OpenRouter,
            model: "test-model".to_owned(),
            max_tokens: 256,
            temperature: 0.0,
            api_key: None,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_owned(),
            verify_timeout_secs: 3,
            allow_insecure_fallback,
        },
        quota: QuotaConfig {
            daily_run_limit: TEST_DAILY_LIMIT,
        },
    }
}

/// Build resources over an in-memory database with the given provider
pub async fn create_test_resources_with(
    config: ServerConfig,
    provider: MockProvider,
) -> Arc<ServerResources> {
    let database = Database::new(&config.database_url)
        .await
        .expect("in-memory database");
    ServerResources::with_provider(database, config, Arc::new(provider))
}

/// Build default resources with an echoing provider
pub async fn create_test_resources() -> Arc<ServerResources> {
    create_test_resources_with(test_config(), MockProvider::Echo).await
}

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    email: &'a str,
    exp: i64,
}

/// Mint a signed bearer token the verifying resolver accepts
pub fn mint_token(user_id: &str, email: &str) -> String {
    let claims = TestClaims {
        sub: user_id,
        email,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode test token")
}

/// `Authorization` header value for a user
pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", mint_token(user_id, "test@example.com"))
}

/// Create a private catalyst owned by the user
pub async fn create_test_catalyst(
    resources: &Arc<ServerResources>,
    owner_id: &str,
    template: &str,
) -> Catalyst {
    resources
        .database
        .catalysts()
        .create(
            owner_id,
            &CreateCatalystRequest {
                name: "Test Catalyst".to_owned(),
                description: None,
                inputs_json: serde_json::json!([]),
                prompt_template: template.to_owned(),
            },
        )
        .await
        .expect("create catalyst")
}

/// Upsert a profile with the given plan for the user
pub async fn create_test_profile(
    resources: &Arc<ServerResources>,
    user_id: &str,
    plan: Plan,
) -> Profile {
    resources
        .database
        .profiles()
        .upsert(
            user_id,
            &UpsertProfileRequest {
                domain: None,
                work_style: None,
                values: vec![],
                plan: Some(plan),
            },
        )
        .await
        .expect("upsert profile")
}
