// ABOUTME: Database operations for per-user personalization profiles
// ABOUTME: One row per user id, created lazily on first upsert
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use serde::Deserialize;
use sqlx::{Row, SqlitePool};

use crate::errors::{AppError, AppResult};
use crate::models::{Plan, Profile};

/// Fields accepted on a profile upsert
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertProfileRequest {
    /// Professional domain
    #[serde(default)]
    pub domain: Option<String>,
    /// Preferred work style
    #[serde(default)]
    pub work_style: Option<String>,
    /// Ordered personal values
    #[serde(default)]
    pub values: Vec<String>,
    /// Entitlement tier; omitted means keep/keep-default
    #[serde(default)]
    pub plan: Option<Plan>,
}

/// Profile database operations
pub struct ProfilesManager {
    pool: SqlitePool,
}

impl ProfilesManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a user's profile; absence is valid and yields `None`
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn get(&self, user_id: &str) -> AppResult<Option<Profile>> {
        let row = sqlx::query(
            r"
            SELECT id, domain, work_style, values_json, plan, created_at
            FROM profiles
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to get profile: {e}")))?;

        row.map(row_to_profile).transpose()
    }

    /// Create or update the caller's profile
    ///
    /// The row is created lazily on first upsert; `created_at` is preserved
    /// across updates. An omitted plan keeps the stored plan (free for new
    /// rows).
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(
        &self,
        user_id: &str,
        request: &UpsertProfileRequest,
    ) -> AppResult<Profile> {
        let now = chrono::Utc::now().to_rfc3339();
        let values_json = serde_json::to_string(&request.values)
            .map_err(|e| AppError::internal(format!("failed to serialize values: {e}")))?;
        let plan = request.plan.map(Plan::as_str);

        sqlx::query(
            r"
            INSERT INTO profiles (id, domain, work_style, values_json, plan, created_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'free'), $6)
            ON CONFLICT (id) DO UPDATE SET
                domain = excluded.domain,
                work_style = excluded.work_style,
                values_json = excluded.values_json,
                plan = COALESCE($5, profiles.plan)
            ",
        )
        .bind(user_id)
        .bind(&request.domain)
        .bind(&request.work_style)
        .bind(&values_json)
        .bind(plan)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to upsert profile: {e}")))?;

        self.get(user_id)
            .await?
            .ok_or_else(|| AppError::internal("profile missing after upsert"))
    }
}

/// Map a database row to a [`Profile`]
fn row_to_profile(row: sqlx::sqlite::SqliteRow) -> AppResult<Profile> {
    let values_raw: String = row.get("values_json");
    let values = serde_json::from_str(&values_raw)
        .map_err(|e| AppError::database(format!("corrupt values_json: {e}")))?;
    let plan: String = row.get("plan");

    Ok(Profile {
        id: row.get("id"),
        domain: row.get("domain"),
        work_style: row.get("work_style"),
        values,
        plan: Plan::from_str_or_free(&plan),
        created_at: row.get("created_at"),
    })
}
