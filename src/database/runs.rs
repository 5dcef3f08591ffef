// ABOUTME: Append-only catalyst run history storage and quota counting queries
// ABOUTME: Counts runs within UTC calendar-day windows for daily limit enforcement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use chrono::{DateTime, Duration, Utc};
use serde_json::Value as JsonValue;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::CatalystRun;

/// Run history database operations
pub struct RunsManager {
    pool: SqlitePool,
}

impl RunsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a run record
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(
        &self,
        catalyst_id: Option<&str>,
        user_id: Option<&str>,
        inputs: &JsonValue,
        output: &str,
    ) -> AppResult<CatalystRun> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let inputs_json = inputs.to_string();

        sqlx::query(
            r"
            INSERT INTO catalyst_runs (id, catalyst_id, user_id, inputs_json, output, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&id)
        .bind(catalyst_id)
        .bind(user_id)
        .bind(&inputs_json)
        .bind(output)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to insert run: {e}")))?;

        Ok(CatalystRun {
            id,
            catalyst_id: catalyst_id.map(ToOwned::to_owned),
            user_id: user_id.map(ToOwned::to_owned),
            inputs: inputs.clone(),
            output: output.to_owned(),
            created_at: now,
        })
    }

    /// Count a user's runs within the current UTC calendar day
    ///
    /// The window is `[today 00:00 UTC, tomorrow 00:00 UTC)`, not a rolling
    /// 24-hour period. Timestamps are stored as RFC 3339 UTC strings, which
    /// order lexicographically, so plain string comparison gives the right
    /// window.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn count_today_utc(&self, user_id: &str) -> AppResult<i64> {
        let (start, end) = utc_day_bounds(Utc::now());
        self.count_between(user_id, &start, &end).await
    }

    /// Count a user's runs within `[start, end)`
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn count_between(&self, user_id: &str, start: &str, end: &str) -> AppResult<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS n
            FROM catalyst_runs
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            ",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to count runs: {e}")))?;

        Ok(row.get("n"))
    }

    /// List a user's runs, newest first
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<CatalystRun>> {
        let rows = sqlx::query(
            r"
            SELECT id, catalyst_id, user_id, inputs_json, output, created_at
            FROM catalyst_runs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to list runs: {e}")))?;

        rows.into_iter().map(row_to_run).collect()
    }

    /// Delete one of the user's own run records (history deletion)
    ///
    /// # Errors
    /// Returns `NotFound` when the run does not exist or belongs to someone
    /// else.
    pub async fn delete(&self, id: &str, user_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM catalyst_runs
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to delete run: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Run not found"));
        }
        Ok(())
    }

    /// Backdate a run record (test support for quota-window queries)
    #[doc(hidden)]
    pub async fn set_created_at(&self, id: &str, created_at: &str) -> AppResult<()> {
        sqlx::query("UPDATE catalyst_runs SET created_at = $2 WHERE id = $1")
            .bind(id)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to update run timestamp: {e}")))?;
        Ok(())
    }
}

/// RFC 3339 bounds of the UTC calendar day containing `at`
#[must_use]
pub fn utc_day_bounds(at: DateTime<Utc>) -> (String, String) {
    let day_start = at
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let next_day_start = day_start + Duration::days(1);
    (day_start.to_rfc3339(), next_day_start.to_rfc3339())
}

/// Map a database row to a [`CatalystRun`]
fn row_to_run(row: sqlx::sqlite::SqliteRow) -> AppResult<CatalystRun> {
    let inputs_raw: String = row.get("inputs_json");
    let inputs = serde_json::from_str(&inputs_raw)
        .map_err(|e| AppError::database(format!("corrupt inputs_json: {e}")))?;

    Ok(CatalystRun {
        id: row.get("id"),
        catalyst_id: row.get("catalyst_id"),
        user_id: row.get("user_id"),
        inputs,
        output: row.get("output"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bounds_are_utc_midnights() {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 23, 59, 59).single();
        let (start, end) = utc_day_bounds(at.unwrap_or_default());
        assert_eq!(start, "2025-06-15T00:00:00+00:00");
        assert_eq!(end, "2025-06-16T00:00:00+00:00");
    }

    #[test]
    fn day_bounds_bracket_stored_timestamps_lexicographically() {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).single();
        let (start, end) = utc_day_bounds(at.unwrap_or_default());
        let in_window = "2025-06-15T12:00:00.123456+00:00";
        let before = "2025-06-14T23:59:59+00:00";
        let after = "2025-06-16T00:00:00.000001+00:00";
        assert!(start.as_str() <= in_window && in_window < end.as_str());
        assert!(before < start.as_str());
        assert!(after >= end.as_str());
    }
}
