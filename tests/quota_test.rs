// ABOUTME: Integration tests for daily run quota enforcement
// ABOUTME: Covers the limit boundary, pro bypass, and UTC day-window counting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{
    bearer, create_test_catalyst, create_test_profile, create_test_resources, TEST_DAILY_LIMIT,
};
use helpers::axum_test::AxumTestRequest;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use flow_catalyst_server::errors::AppError;
use flow_catalyst_server::models::Plan;
use flow_catalyst_server::server;

/// Insert `n` run rows for the user dated now
async fn seed_runs(resources: &std::sync::Arc<flow_catalyst_server::server::ServerResources>, user_id: &str, n: u32) {
    for _ in 0..n {
        resources
            .database
            .runs()
            .insert(None, Some(user_id), &json!({}), "seed output")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn free_user_below_limit_is_admitted() {
    let resources = create_test_resources().await;
    seed_runs(&resources, "u1", TEST_DAILY_LIMIT - 1).await;

    resources
        .quota
        .check(&resources.database.runs(), "u1", false)
        .await
        .unwrap();
}

#[tokio::test]
async fn free_user_at_limit_is_denied_with_limit_in_error() {
    let resources = create_test_resources().await;
    seed_runs(&resources, "u1", TEST_DAILY_LIMIT).await;

    let err = resources
        .quota
        .check(&resources.database.runs(), "u1", false)
        .await
        .unwrap_err();
    match err {
        AppError::DailyLimitReached { limit } => assert_eq!(limit, TEST_DAILY_LIMIT),
        other => panic!("expected DailyLimitReached, got {other:?}"),
    }
}

#[tokio::test]
async fn pro_user_is_always_admitted() {
    let resources = create_test_resources().await;
    seed_runs(&resources, "u1", TEST_DAILY_LIMIT * 4).await;

    resources
        .quota
        .check(&resources.database.runs(), "u1", true)
        .await
        .unwrap();
}

#[tokio::test]
async fn yesterdays_runs_do_not_count_toward_today() {
    let resources = create_test_resources().await;
    let runs = resources.database.runs();

    for _ in 0..TEST_DAILY_LIMIT {
        let run = runs
            .insert(None, Some("u1"), &json!({}), "old output")
            .await
            .unwrap();
        let yesterday = (Utc::now() - Duration::days(1)).to_rfc3339();
        runs.set_created_at(&run.id, &yesterday).await.unwrap();
    }

    assert_eq!(runs.count_today_utc("u1").await.unwrap(), 0);
    resources.quota.check(&runs, "u1", false).await.unwrap();
}

#[tokio::test]
async fn quota_counts_are_per_user() {
    let resources = create_test_resources().await;
    seed_runs(&resources, "heavy", TEST_DAILY_LIMIT).await;

    // A different user is unaffected.
    resources
        .quota
        .check(&resources.database.runs(), "light", false)
        .await
        .unwrap();
}

// ============================================================================
// End-to-end through the run endpoint
// ============================================================================

#[tokio::test]
async fn run_endpoint_returns_429_at_limit() {
    let resources = create_test_resources().await;
    let catalyst = create_test_catalyst(&resources, "u1", "Hi {x}").await;
    seed_runs(&resources, "u1", TEST_DAILY_LIMIT).await;

    let response = AxumTestRequest::post("/api/runs")
        .header("authorization", &bearer("u1"))
        .json(&json!({"catalyst_id": catalyst.id, "inputs": {"x": "v"}}))
        .send(server::router(resources))
        .await;

    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = response.json();
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains(&TEST_DAILY_LIMIT.to_string()));
}

#[tokio::test]
async fn run_endpoint_admits_at_limit_minus_one() {
    let resources = create_test_resources().await;
    let catalyst = create_test_catalyst(&resources, "u1", "Hi {x}").await;
    seed_runs(&resources, "u1", TEST_DAILY_LIMIT - 1).await;

    let response = AxumTestRequest::post("/api/runs")
        .header("authorization", &bearer("u1"))
        .json(&json!({"catalyst_id": catalyst.id, "inputs": {"x": "v"}}))
        .send(server::router(resources))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn pro_plan_bypasses_quota_on_run_endpoint() {
    let resources = create_test_resources().await;
    let catalyst = create_test_catalyst(&resources, "u1", "Hi {x}").await;
    create_test_profile(&resources, "u1", Plan::Pro).await;
    seed_runs(&resources, "u1", TEST_DAILY_LIMIT * 2).await;

    let response = AxumTestRequest::post("/api/runs")
        .header("authorization", &bearer("u1"))
        .json(&json!({"catalyst_id": catalyst.id, "inputs": {"x": "v"}}))
        .send(server::router(resources))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}
