// ABOUTME: Catalyst CRUD endpoints with owner-filtered access
// ABOUTME: Create, list, get, update, and delete private catalysts; system rows read-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Catalyst routes
//!
//! All endpoints require bearer auth. Visibility rules are enforced in SQL:
//! readers see their own rows plus system rows; writers touch only their own
//! private rows.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::{CreateCatalystRequest, UpdateCatalystRequest};
use crate::errors::{AppError, AppResult};
use crate::models::Catalyst;
use crate::server::ServerResources;

/// Catalyst listing wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalystListResponse {
    /// Visible catalysts, newest first
    pub catalysts: Vec<Catalyst>,
}

/// Catalyst routes handler
pub struct CatalystRoutes;

impl CatalystRoutes {
    /// Create all catalyst routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/catalysts", post(Self::create))
            .route("/api/catalysts", get(Self::list))
            .route("/api/catalysts/:catalyst_id", get(Self::get))
            .route("/api/catalysts/:catalyst_id", put(Self::update))
            .route("/api/catalysts/:catalyst_id", delete(Self::remove))
            .with_state(resources)
    }

    /// Create a private catalyst owned by the caller
    async fn create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateCatalystRequest>,
    ) -> Response {
        let result: AppResult<Catalyst> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            validate_create(&request)?;
            let catalyst = resources
                .database
                .catalysts()
                .create(&identity.user_id, &request)
                .await?;
            info!(catalyst_id = %catalyst.id, user_id = %identity.user_id, "catalyst created");
            Ok(catalyst)
        }
        .await;

        match result {
            Ok(catalyst) => Json(catalyst).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// List the caller's catalysts plus system catalysts
    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let result: AppResult<CatalystListResponse> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            let catalysts = resources
                .database
                .catalysts()
                .list_visible(&identity.user_id)
                .await?;
            Ok(CatalystListResponse { catalysts })
        }
        .await;

        match result {
            Ok(response) => Json(response).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// Fetch one visible catalyst
    async fn get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(catalyst_id): Path<String>,
    ) -> Response {
        let result: AppResult<Catalyst> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            resources
                .database
                .catalysts()
                .get_visible(&catalyst_id, &identity.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Catalyst not found"))
        }
        .await;

        match result {
            Ok(catalyst) => Json(catalyst).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// Update a catalyst the caller owns
    async fn update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(catalyst_id): Path<String>,
        Json(request): Json<UpdateCatalystRequest>,
    ) -> Response {
        let result: AppResult<Catalyst> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            if let Some(inputs) = &request.inputs_json {
                if !inputs.is_array() {
                    return Err(AppError::validation("inputs_json must be an array"));
                }
            }
            resources
                .database
                .catalysts()
                .update(&catalyst_id, &identity.user_id, &request)
                .await
        }
        .await;

        match result {
            Ok(catalyst) => Json(catalyst).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// Delete a catalyst the caller owns
    async fn remove(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(catalyst_id): Path<String>,
    ) -> Response {
        let result: AppResult<()> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            resources
                .database
                .catalysts()
                .delete(&catalyst_id, &identity.user_id)
                .await
        }
        .await;

        match result {
            Ok(()) => Json(serde_json::json!({"deleted": true})).into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// Shape checks for the create request
fn validate_create(request: &CreateCatalystRequest) -> AppResult<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if request.prompt_template.trim().is_empty() {
        return Err(AppError::validation("prompt_template is required"));
    }
    if !request.inputs_json.is_array() {
        return Err(AppError::validation("inputs_json must be an array"));
    }
    Ok(())
}
