// ABOUTME: Integration tests for the catalyst CRUD endpoints
// ABOUTME: Covers creation validation, ownership-filtered visibility, updates, and deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{bearer, create_test_catalyst, create_test_resources};
use helpers::axum_test::AxumTestRequest;

use axum::http::StatusCode;
use serde_json::json;

use flow_catalyst_server::models::{Catalyst, Visibility};
use flow_catalyst_server::routes::catalysts::CatalystListResponse;
use flow_catalyst_server::server;

#[tokio::test]
async fn create_returns_the_new_private_catalyst() {
    let resources = create_test_resources().await;

    let response = AxumTestRequest::post("/api/catalysts")
        .header("authorization", &bearer("u1"))
        .json(&json!({
            "name": "Weekly Review",
            "description": "Reflect on the week",
            "inputs_json": [{"name": "highlight", "type": "text"}],
            "prompt_template": "Review my week. Highlight: {highlight}"
        }))
        .send(server::router(resources))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let catalyst: Catalyst = response.json();
    assert_eq!(catalyst.name, "Weekly Review");
    assert_eq!(catalyst.owner_id.as_deref(), Some("u1"));
    assert_eq!(catalyst.visibility, Visibility::Private);
    assert!(!catalyst.id.is_empty());
}

#[tokio::test]
async fn create_requires_auth() {
    let resources = create_test_resources().await;
    let response = AxumTestRequest::post("/api/catalysts")
        .json(&json!({
            "name": "X",
            "inputs_json": [],
            "prompt_template": "Y"
        }))
        .send(server::router(resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_validates_required_fields() {
    let resources = create_test_resources().await;

    // Missing name.
    let response = AxumTestRequest::post("/api/catalysts")
        .header("authorization", &bearer("u1"))
        .json(&json!({"name": " ", "inputs_json": [], "prompt_template": "T"}))
        .send(server::router(resources.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Missing template.
    let response = AxumTestRequest::post("/api/catalysts")
        .header("authorization", &bearer("u1"))
        .json(&json!({"name": "N", "inputs_json": [], "prompt_template": ""}))
        .send(server::router(resources.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // inputs_json not an array.
    let response = AxumTestRequest::post("/api/catalysts")
        .header("authorization", &bearer("u1"))
        .json(&json!({"name": "N", "inputs_json": {}, "prompt_template": "T"}))
        .send(server::router(resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_shows_own_and_system_but_not_others() {
    let resources = create_test_resources().await;
    create_test_catalyst(&resources, "u1", "Mine {x}").await;
    create_test_catalyst(&resources, "u2", "Theirs {x}").await;
    resources
        .database
        .catalysts()
        .create_system("Shared", "System {x}", &json!([]))
        .await
        .unwrap();

    let response = AxumTestRequest::get("/api/catalysts")
        .header("authorization", &bearer("u1"))
        .send(server::router(resources))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let list: CatalystListResponse = response.json();
    assert_eq!(list.catalysts.len(), 2);
    let names: Vec<_> = list.catalysts.iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains(&"Test Catalyst"));
    assert!(names.contains(&"Shared"));
}

#[tokio::test]
async fn owner_can_update_own_catalyst() {
    let resources = create_test_resources().await;
    let catalyst = create_test_catalyst(&resources, "u1", "Old {x}").await;

    let response = AxumTestRequest::put(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("u1"))
        .json(&json!({"prompt_template": "New {x}", "name": "Renamed"}))
        .send(server::router(resources))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Catalyst = response.json();
    assert_eq!(updated.prompt_template, "New {x}");
    assert_eq!(updated.name, "Renamed");
    // Untouched fields survive.
    assert_eq!(updated.owner_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() {
    let resources = create_test_resources().await;
    let catalyst = create_test_catalyst(&resources, "owner", "T {x}").await;

    let response = AxumTestRequest::put(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("intruder"))
        .json(&json!({"name": "Hijacked"}))
        .send(server::router(resources.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = AxumTestRequest::delete(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("intruder"))
        .send(server::router(resources.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Still present for the owner.
    let response = AxumTestRequest::get(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("owner"))
        .send(server::router(resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn system_catalysts_are_immutable_to_users() {
    let resources = create_test_resources().await;
    let catalyst = resources
        .database
        .catalysts()
        .create_system("Shared", "System {x}", &json!([]))
        .await
        .unwrap();

    let response = AxumTestRequest::put(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("u1"))
        .json(&json!({"name": "Vandalized"}))
        .send(server::router(resources.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = AxumTestRequest::delete(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("u1"))
        .send(server::router(resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_can_delete_own_catalyst() {
    let resources = create_test_resources().await;
    let catalyst = create_test_catalyst(&resources, "u1", "T {x}").await;

    let response = AxumTestRequest::delete(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("u1"))
        .send(server::router(resources.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = AxumTestRequest::get(&format!("/api/catalysts/{}", catalyst.id))
        .header("authorization", &bearer("u1"))
        .send(server::router(resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_missing_catalyst_is_not_found() {
    let resources = create_test_resources().await;
    let response = AxumTestRequest::delete("/api/catalysts/nonexistent")
        .header("authorization", &bearer("u1"))
        .send(server::router(resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
