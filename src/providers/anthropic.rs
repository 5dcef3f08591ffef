// ABOUTME: Anthropic messages API adapter with request/response shapes
// ABOUTME: Single POST to /v1/messages, extracts the first text content block
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::environment::LlmConfig;
use crate::errors::AppResult;

const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header required by Anthropic
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// One messages-API round trip against Anthropic
pub(super) async fn generate(client: &Client, config: &LlmConfig, prompt: &str) -> AppResult<String> {
    let api_key = config.require_api_key()?;

    let request = MessagesRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        messages: [Message {
            role: "user",
            content: prompt,
        }],
    };

    let response = client
        .post(API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(|e| super::request_failed("Anthropic", &e))?;

    if !response.status().is_success() {
        return Err(super::error_from_response("Anthropic", response).await);
    }

    let body: MessagesResponse = response
        .json()
        .await
        .map_err(|e| super::request_failed("Anthropic", &e))?;

    body.content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| super::empty_response("Anthropic"))
}
