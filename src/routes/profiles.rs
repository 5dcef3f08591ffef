// ABOUTME: Profile endpoints for reading and upserting per-user personalization context
// ABOUTME: Profiles are created lazily; absence reads as 404 with no side effects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

use crate::database::UpsertProfileRequest;
use crate::errors::{AppError, AppResult};
use crate::models::Profile;
use crate::server::ServerResources;

/// Profile routes handler
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/profile", get(Self::get_profile))
            .route("/api/profile", put(Self::upsert_profile))
            .with_state(resources)
    }

    /// Fetch the caller's profile
    async fn get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let result: AppResult<Profile> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            resources
                .database
                .profiles()
                .get(&identity.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Profile not found"))
        }
        .await;

        match result {
            Ok(profile) => Json(profile).into_response(),
            Err(err) => err.into_response(),
        }
    }

    /// Create or update the caller's profile
    async fn upsert_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpsertProfileRequest>,
    ) -> Response {
        let result: AppResult<Profile> = async {
            let identity = resources.auth.resolve_headers(&headers).await?;
            resources
                .database
                .profiles()
                .upsert(&identity.user_id, &request)
                .await
        }
        .await;

        match result {
            Ok(profile) => Json(profile).into_response(),
            Err(err) => err.into_response(),
        }
    }
}
