// ABOUTME: Common data models for catalysts, profiles, and run history records
// ABOUTME: Serde-serializable structs shared by the database layer and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Data models
//!
//! Timestamps are stored and serialized as RFC 3339 strings in UTC. User ids
//! are opaque strings issued by the identity provider.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Who can see and run a catalyst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible only to the owning user
    Private,
    /// Shipped with the product, visible to everyone, immutable to end users
    System,
}

impl Visibility {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::System => "system",
        }
    }

    /// Parse from the storage representation, defaulting unknown values to private
    #[must_use]
    pub fn from_str_or_private(s: &str) -> Self {
        if s == "system" {
            Self::System
        } else {
            Self::Private
        }
    }
}

/// Entitlement tier for a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Default tier, subject to the daily run quota
    #[default]
    Free,
    /// Unlimited runs and access to the full coach catalog
    Pro,
}

impl Plan {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Parse from the storage representation, defaulting unknown values to free
    #[must_use]
    pub fn from_str_or_free(s: &str) -> Self {
        if s == "pro" {
            Self::Pro
        } else {
            Self::Free
        }
    }

    /// Whether this plan bypasses the daily quota
    #[must_use]
    pub const fn is_pro(self) -> bool {
        matches!(self, Self::Pro)
    }
}

/// A reusable prompt definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalyst {
    /// Opaque unique identifier
    pub id: String,
    /// Creating user; `None` for system catalysts
    pub owner_id: Option<String>,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Ordered input descriptors (`[{name, type, ...}, ...]`)
    pub inputs_json: JsonValue,
    /// Template string containing `{name}` placeholders
    pub prompt_template: String,
    /// Private or system
    pub visibility: Visibility,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Per-user personalization context
///
/// Absence of a profile is valid everywhere it is consumed; it means "no
/// context", not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// User identifier (one profile per user)
    pub id: String,
    /// Professional domain, free text
    pub domain: Option<String>,
    /// Preferred work style, free text
    pub work_style: Option<String>,
    /// Ordered list of personal values
    pub values: Vec<String>,
    /// Entitlement tier
    pub plan: Plan,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

impl Profile {
    /// Whether any context field would contribute to a rendered prompt
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.domain.as_deref().is_some_and(|d| !d.is_empty())
            || self.work_style.as_deref().is_some_and(|w| !w.is_empty())
            || !self.values.is_empty()
    }
}

/// Append-only audit record of one catalyst execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalystRun {
    /// Opaque unique identifier
    pub id: String,
    /// Executed catalyst; `None` for anonymous/built-in runs
    pub catalyst_id: Option<String>,
    /// Executing user; `None` for anonymous runs
    pub user_id: Option<String>,
    /// Input map captured at run time
    pub inputs: JsonValue,
    /// AI-generated output (or the substituted failure text)
    pub output: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}
