// ABOUTME: OpenAI chat-completions adapter with request/response shapes
// ABOUTME: Single POST to /v1/chat/completions, extracts choices[0].message.content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::environment::LlmConfig;
use crate::errors::AppResult;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// One chat-completion round trip against OpenAI
pub(super) async fn generate(client: &Client, config: &LlmConfig, prompt: &str) -> AppResult<String> {
    let api_key = config.require_api_key()?;

    let request = ChatRequest {
        model: &config.model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let response = client
        .post(API_URL)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| super::request_failed("OpenAI", &e))?;

    if !response.status().is_success() {
        return Err(super::error_from_response("OpenAI", response).await);
    }

    let body: ChatResponse = response
        .json()
        .await
        .map_err(|e| super::request_failed("OpenAI", &e))?;

    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| super::empty_response("OpenAI"))
}
