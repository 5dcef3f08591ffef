// ABOUTME: Google Gemini generateContent adapter with request/response shapes
// ABOUTME: Single POST per call, extracts candidates[0].content.parts[0].text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::environment::LlmConfig;
use crate::errors::AppResult;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// One generateContent round trip against Gemini
pub(super) async fn generate(client: &Client, config: &LlmConfig, prompt: &str) -> AppResult<String> {
    let api_key = config.require_api_key()?;
    let url = format!("{API_BASE}/{}:generateContent", config.model);

    let request = GenerateRequest {
        contents: [Content {
            parts: [Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: config.max_tokens,
            temperature: config.temperature,
        },
    };

    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(&request)
        .send()
        .await
        .map_err(|e| super::request_failed("Gemini", &e))?;

    if !response.status().is_success() {
        return Err(super::error_from_response("Gemini", response).await);
    }

    let body: GenerateResponse = response
        .json()
        .await
        .map_err(|e| super::request_failed("Gemini", &e))?;

    body.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| super::empty_response("Gemini"))
}
