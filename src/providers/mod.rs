// ABOUTME: Uniform text-generation interface over upstream LLM provider HTTP APIs
// ABOUTME: Dispatches to OpenRouter, OpenAI, Anthropic, or Gemini per configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Provider adapters
//!
//! Each adapter performs a single stateless request/response round trip: it
//! builds the vendor-specific JSON request, POSTs it, and extracts the one
//! generated text field from the vendor-specific response shape. No retries,
//! no streaming, no multi-turn state.
//!
//! Provider selection happens once at construction from [`LlmConfig`]; an
//! unsupported provider name already failed during configuration parsing, so
//! no network call is ever attempted for it.

mod anthropic;
mod gemini;
mod openai;
mod openrouter;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::environment::{LlmConfig, LlmProviderType};
use crate::errors::{AppError, AppResult};

/// Timeout applied to each provider HTTP request
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum raw-body length echoed into error messages
const ERROR_BODY_SNIPPET_LEN: usize = 300;

/// Single-shot text generation against an upstream LLM
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a completion for the prompt, returning trimmed text
    ///
    /// # Errors
    /// Returns an upstream provider error for non-success HTTP statuses,
    /// transport failures, or empty responses.
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// HTTP-backed [`TextProvider`] dispatching on the configured vendor
pub struct HttpTextProvider {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpTextProvider {
    /// Build a provider from explicit configuration
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// The configured provider type
    #[must_use]
    pub const fn provider_type(&self) -> LlmProviderType {
        self.config.provider
    }
}

#[async_trait]
impl TextProvider for HttpTextProvider {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        match self.config.provider {
            LlmProviderType::OpenRouter => {
                openrouter::generate(&self.client, &self.config, prompt).await
            }
            LlmProviderType::OpenAi => openai::generate(&self.client, &self.config, prompt).await,
            LlmProviderType::Anthropic => {
                anthropic::generate(&self.client, &self.config, prompt).await
            }
            LlmProviderType::Gemini => gemini::generate(&self.client, &self.config, prompt).await,
        }
    }
}

/// Vendor error envelope shared by all four APIs (`{"error": {"message": ...}}`)
#[derive(Debug, Deserialize)]
struct VendorErrorEnvelope {
    error: Option<VendorError>,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    message: Option<String>,
}

/// Convert a non-success provider response into an `UpstreamProvider` error
///
/// Parses the vendor's structured error message where possible and
/// special-cases HTTP 429 into a human-readable rate-limit explanation.
pub(crate) async fn error_from_response(
    provider_name: &str,
    response: reqwest::Response,
) -> AppError {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();

    let parsed = serde_json::from_str::<VendorErrorEnvelope>(&raw)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message);

    let detail = parsed.unwrap_or_else(|| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            "no error detail provided".to_owned()
        } else {
            trimmed.chars().take(ERROR_BODY_SNIPPET_LEN).collect()
        }
    });

    let message = if status == 429 {
        format!("{provider_name} is rate-limiting requests right now; wait a moment and try again ({detail})")
    } else {
        format!("{provider_name} request failed: {detail}")
    };

    AppError::UpstreamProvider { status, message }
}

/// Error for a transport-level failure before any status was received
pub(crate) fn request_failed(provider_name: &str, err: &reqwest::Error) -> AppError {
    AppError::UpstreamProvider {
        status: 503,
        message: format!("could not reach {provider_name}: {err}"),
    }
}

/// Error for a success response with no generated text
pub(crate) fn empty_response(provider_name: &str) -> AppError {
    AppError::UpstreamProvider {
        status: 200,
        message: format!("{provider_name} returned an empty response"),
    }
}
