// ABOUTME: Refine endpoints for iterating on text and structured coach inputs
// ABOUTME: Degrades gracefully by echoing the caller's input when the provider or parsing fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Refine routes
//!
//! `POST /api/refine` improves a block of text per an instruction;
//! `POST /api/refine-coach` rewrites a structured input map for a built-in
//! coach and may pose follow-up questions. Both follow the errors-become-
//! content policy: an upstream or parse failure returns the original input
//! unchanged rather than an error status.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::builtin;
use crate::errors::{AppError, AppResult};
use crate::server::ServerResources;

/// Request for a free-text refinement
#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    /// What to do with the text
    pub instruction: String,
    /// The current text
    pub text: String,
}

/// Free-text refinement result
#[derive(Debug, Serialize, Deserialize)]
pub struct RefineResponse {
    /// Refined text, or the original on failure
    pub suggestion: String,
}

/// Request for a structured coach-input refinement
#[derive(Debug, Deserialize)]
pub struct RefineCoachRequest {
    /// What to change about the inputs
    pub instruction: String,
    /// Current input map
    pub inputs: JsonValue,
    /// Built-in coach whose slots give the refinement context
    #[serde(default)]
    pub coach_id: Option<String>,
}

/// Follow-up question the model wants answered
#[derive(Debug, Serialize, Deserialize)]
pub struct RefineQuestion {
    /// Stable question id
    pub id: String,
    /// Question text
    pub text: String,
    /// The input field the answer feeds
    pub field: String,
}

/// Structured refinement result
#[derive(Debug, Serialize, Deserialize)]
pub struct RefineCoachResponse {
    /// Refined input map, or the original on failure
    #[serde(rename = "refinedInputs")]
    pub refined_inputs: JsonValue,
    /// Optional follow-up questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<RefineQuestion>>,
}

/// Model output shape requested from the provider for refine-coach
#[derive(Debug, Deserialize)]
struct RefineCoachModelOutput {
    #[serde(rename = "refinedInputs")]
    refined_inputs: JsonValue,
    #[serde(default)]
    questions: Option<Vec<RefineQuestion>>,
}

/// Refine routes handler
pub struct RefineRoutes;

impl RefineRoutes {
    /// Create all refine routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/refine", post(Self::refine))
            .route("/api/refine-coach", post(Self::refine_coach))
            .with_state(resources)
    }

    /// Refine a block of text per the instruction
    async fn refine(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RefineRequest>,
    ) -> Response {
        if request.instruction.trim().is_empty() {
            return AppError::validation("instruction is required").into_response();
        }

        let prompt = format!(
            "Rewrite the text below following this instruction: {}\n\n\
Return only the rewritten text with no preamble.\n\n---\n{}",
            request.instruction, request.text
        );

        let suggestion = match resources.provider.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!("refine degraded to echo: {err}");
                request.text
            }
        };

        Json(RefineResponse { suggestion }).into_response()
    }

    /// Refine a structured input map for a built-in coach
    async fn refine_coach(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RefineCoachRequest>,
    ) -> Response {
        let result: AppResult<RefineCoachResponse> = async {
            if request.instruction.trim().is_empty() {
                return Err(AppError::validation("instruction is required"));
            }
            if !request.inputs.is_object() {
                return Err(AppError::validation("inputs must be a JSON object"));
            }
            Ok(Self::refine_coach_inner(&resources, &request).await)
        }
        .await;

        match result {
            Ok(response) => Json(response).into_response(),
            Err(err) => err.into_response(),
        }
    }

    async fn refine_coach_inner(
        resources: &Arc<ServerResources>,
        request: &RefineCoachRequest,
    ) -> RefineCoachResponse {
        let echo = RefineCoachResponse {
            refined_inputs: request.inputs.clone(),
            questions: None,
        };

        let prompt = Self::build_coach_prompt(request);
        let raw = match resources.provider.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!("refine-coach degraded to echo: {err}");
                return echo;
            }
        };

        match parse_model_json::<RefineCoachModelOutput>(&raw) {
            Some(output) if output.refined_inputs.is_object() => RefineCoachResponse {
                refined_inputs: output.refined_inputs,
                questions: output.questions.filter(|q| !q.is_empty()),
            },
            _ => {
                warn!("refine-coach response was not parseable JSON, echoing inputs");
                echo
            }
        }
    }

    fn build_coach_prompt(request: &RefineCoachRequest) -> String {
        let slots_context = request
            .coach_id
            .as_deref()
            .and_then(builtin::find)
            .map(|coach| {
                format!(
                    "\nThe inputs feed the '{}' template: {}\n",
                    coach.name, coach.prompt_template
                )
            })
            .unwrap_or_default();

        format!(
            "Improve this set of named inputs following the instruction: {}\n{}\n\
Current inputs as JSON:\n{}\n\n\
Respond with strict JSON only, shaped as \
{{\"refinedInputs\": {{...}}, \"questions\": [{{\"id\": \"...\", \"text\": \"...\", \"field\": \"...\"}}]}}. \
Omit \"questions\" if none are needed.",
            request.instruction, slots_context, request.inputs
        )
    }
}

/// Parse model output as JSON, tolerating markdown code fences
fn parse_model_json<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    if let Ok(parsed) = serde_json::from_str(raw) {
        return Some(parsed);
    }
    // Models often wrap JSON in a fenced block; extract the outermost braces.
    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}
