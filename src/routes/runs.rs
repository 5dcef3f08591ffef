// ABOUTME: Run orchestration endpoints: execute catalysts, list and delete run history
// ABOUTME: Composes auth, catalyst/profile loading, quota, rendering, and provider dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Run routes
//!
//! The run endpoint is the orchestrator from the product's point of view.
//! Two paths exist:
//!
//! - **Built-in (anonymous)**: the request inlines a built-in coach template.
//!   No authentication, no quota, no persistence; the client tracks free
//!   usage on-device.
//! - **Registered catalyst**: authenticated, ownership-checked, quota-gated,
//!   and recorded in run history.
//!
//! Provider failures never fail the request on either path: the failure text
//! becomes the output so the client always has something to render.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{error, info, warn};

use crate::auth::AuthIdentity;
use crate::builtin;
use crate::errors::{AppError, AppResult};
use crate::models::{CatalystRun, Plan, Profile};
use crate::server::ServerResources;
use crate::templating;

/// Request body for the run endpoint
///
/// Exactly one of `catalyst_id` and `built_in` must be present.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Registered catalyst to execute
    #[serde(default)]
    pub catalyst_id: Option<String>,
    /// Inline built-in coach (anonymous path)
    #[serde(default)]
    pub built_in: Option<BuiltInRunRequest>,
    /// Named input values substituted into the template
    pub inputs: JsonValue,
}

/// Inline built-in coach reference
#[derive(Debug, Deserialize)]
pub struct BuiltInRunRequest {
    /// Built-in coach id (client-side catalog key)
    pub id: String,
    /// The coach's template, shipped with the client
    pub prompt_template: String,
}

/// Successful run response
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    /// AI-generated output, or the substituted failure text
    pub output: String,
    /// Prompt assembly trace for developer troubleshooting
    #[serde(rename = "promptDebug")]
    pub prompt_debug: String,
}

/// One row in the run history listing
#[derive(Debug, Serialize, Deserialize)]
pub struct RunHistoryResponse {
    /// Run id
    pub id: String,
    /// Catalyst executed, if any
    pub catalyst_id: Option<String>,
    /// Inputs captured at run time
    pub inputs: JsonValue,
    /// Output produced
    pub output: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl From<CatalystRun> for RunHistoryResponse {
    fn from(run: CatalystRun) -> Self {
        Self {
            id: run.id,
            catalyst_id: run.catalyst_id,
            inputs: run.inputs,
            output: run.output,
            created_at: run.created_at,
        }
    }
}

/// Run history listing wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct RunListResponse {
    /// Runs, newest first
    pub runs: Vec<RunHistoryResponse>,
}

/// Built-in coach catalog entry as served to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct CoachResponse {
    /// Stable coach id
    pub id: String,
    /// Display name
    pub name: String,
    /// Template with placeholder slots
    pub prompt_template: String,
    /// The two context slots
    pub context_slots: Vec<String>,
    /// The adjustable value lever
    pub value_lever: String,
    /// Minimum plan required
    pub tier: Plan,
}

/// Built-in coach catalog listing
#[derive(Debug, Serialize, Deserialize)]
pub struct CoachListResponse {
    /// Coaches visible to the caller's plan
    pub coaches: Vec<CoachResponse>,
}

/// Query parameters for listing run history
#[derive(Debug, Deserialize, Default)]
pub struct ListRunsQuery {
    /// Maximum rows returned
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Pagination offset
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    20
}

/// Run routes handler
pub struct RunRoutes;

impl RunRoutes {
    /// Create all run routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/runs", post(Self::execute))
            .route("/api/runs", get(Self::list_history))
            .route("/api/runs/:run_id", delete(Self::delete_run))
            .route("/api/coaches", get(Self::list_coaches))
            .with_state(resources)
    }

    /// Execute a catalyst or built-in coach
    async fn execute(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<RunRequest>,
    ) -> Response {
        match Self::execute_inner(&resources, &headers, request).await {
            Ok(response) => Json(response).into_response(),
            Err(err) => err.into_response(),
        }
    }

    #[tracing::instrument(skip_all, fields(route = "run"))]
    async fn execute_inner(
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        request: RunRequest,
    ) -> AppResult<RunResponse> {
        let inputs = validate_inputs(&request.inputs)?;

        match (&request.catalyst_id, &request.built_in) {
            (None, Some(built_in)) => {
                Self::run_built_in(resources, built_in, inputs).await
            }
            (Some(catalyst_id), None) => {
                Self::run_catalyst(resources, headers, catalyst_id, inputs, &request.inputs).await
            }
            _ => Err(AppError::validation(
                "Provide exactly one of catalyst_id or built_in",
            )),
        }
    }

    /// Anonymous built-in path: render and generate, nothing else
    async fn run_built_in(
        resources: &Arc<ServerResources>,
        built_in: &BuiltInRunRequest,
        inputs: &Map<String, JsonValue>,
    ) -> AppResult<RunResponse> {
        if built_in.prompt_template.trim().is_empty() {
            return Err(AppError::validation("built_in.prompt_template is required"));
        }

        info!(coach_id = %built_in.id, "anonymous built-in run");

        let rendered = templating::render(&built_in.prompt_template, inputs, None);
        let output = Self::generate_with_substitution(resources, &rendered.prompt).await;

        Ok(RunResponse {
            output,
            prompt_debug: rendered.debug,
        })
    }

    /// Registered-catalyst path: the full orchestration state machine
    async fn run_catalyst(
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        catalyst_id: &str,
        inputs: &Map<String, JsonValue>,
        raw_inputs: &JsonValue,
    ) -> AppResult<RunResponse> {
        if catalyst_id.trim().is_empty() {
            return Err(AppError::validation("catalyst_id must not be empty"));
        }

        // Fail closed on any auth failure.
        let identity = resources.auth.resolve_headers(headers).await?;

        let catalyst = resources
            .database
            .catalysts()
            .get_visible(catalyst_id, &identity.user_id)
            .await?
            .ok_or_else(|| {
                warn!(catalyst_id, user_id = %identity.user_id, "catalyst not found or not visible");
                AppError::not_found("Catalyst not found")
            })?;

        // Absence of a profile is "no context", not an error.
        let profile = resources
            .database
            .profiles()
            .get(&identity.user_id)
            .await?;

        let is_pro = profile.as_ref().is_some_and(|p| p.plan.is_pro());
        resources
            .quota
            .check(&resources.database.runs(), &identity.user_id, is_pro)
            .await?;

        let rendered =
            templating::render(&catalyst.prompt_template, inputs, profile.as_ref());

        let output = Self::generate_with_substitution(resources, &rendered.prompt).await;

        Self::persist_run(resources, &catalyst.id, &identity, raw_inputs, &output).await;

        Ok(RunResponse {
            output,
            prompt_debug: rendered.debug,
        })
    }

    /// Call the provider, converting failures into renderable output text
    async fn generate_with_substitution(
        resources: &Arc<ServerResources>,
        prompt: &str,
    ) -> String {
        match resources.provider.generate(prompt).await {
            Ok(text) => text,
            Err(err) => {
                error!("provider call failed, substituting error as content: {err}");
                format!("The AI provider could not complete this run.\n\n{err}")
            }
        }
    }

    /// Record the run; failures are logged and swallowed so they never mask
    /// an AI response already obtained
    async fn persist_run(
        resources: &Arc<ServerResources>,
        catalyst_id: &str,
        identity: &AuthIdentity,
        inputs: &JsonValue,
        output: &str,
    ) {
        if let Err(err) = resources
            .database
            .runs()
            .insert(Some(catalyst_id), Some(&identity.user_id), inputs, output)
            .await
        {
            error!(catalyst_id, user_id = %identity.user_id, "failed to persist run: {err}");
        }
    }

    /// List the caller's run history
    async fn list_history(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListRunsQuery>,
    ) -> Response {
        let result: AppResult<RunListResponse> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            let runs = resources
                .database
                .runs()
                .list_for_user(&identity.user_id, query.limit.clamp(1, 100), query.offset.max(0))
                .await?;
            Ok(RunListResponse {
                runs: runs.into_iter().map(RunHistoryResponse::from).collect(),
            })
        }
        .await;

        match result {
            Ok(response) => Json(response).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// Delete one of the caller's run records
    async fn delete_run(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(run_id): Path<String>,
    ) -> Response {
        let result: AppResult<()> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            resources.database.runs().delete(&run_id, &identity.user_id).await
        }
        .await;

        match result {
            Ok(()) => Json(serde_json::json!({"deleted": true})).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// List built-in coaches visible to the caller's plan
    ///
    /// Anonymous callers see the free tier; authenticated pro users see the
    /// full catalog.
    async fn list_coaches(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let plan = Self::caller_plan(&resources, &headers).await;
        let coaches = builtin::for_plan(plan)
            .into_iter()
            .map(|c| CoachResponse {
                id: c.id.to_owned(),
                name: c.name.to_owned(),
                prompt_template: c.prompt_template.to_owned(),
                context_slots: c.context_slots.iter().map(|s| (*s).to_owned()).collect(),
                value_lever: c.value_lever.to_owned(),
                tier: c.tier,
            })
            .collect();
        Json(CoachListResponse { coaches }).into_response()
    }

    /// Best-effort plan resolution; anonymous and failed lookups are free
    async fn caller_plan(resources: &Arc<ServerResources>, headers: &HeaderMap) -> Plan {
        let Ok(identity) = resources.auth.resolve_headers(headers).await else {
            return Plan::Free;
        };
        resources
            .database
            .profiles()
            .get(&identity.user_id)
            .await
            .ok()
            .flatten()
            .map_or(Plan::Free, |p: Profile| p.plan)
    }
}

/// Require the inputs value to be a JSON object
fn validate_inputs(inputs: &JsonValue) -> AppResult<&Map<String, JsonValue>> {
    inputs
        .as_object()
        .ok_or_else(|| AppError::validation("inputs must be a JSON object"))
}
