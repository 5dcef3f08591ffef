// ABOUTME: Test helper module organization
// ABOUTME: Exposes the in-process Axum request builder used by route tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst
#![allow(dead_code)]

/// In-process request/response helpers for exercising Axum routers
pub mod axum_test;
