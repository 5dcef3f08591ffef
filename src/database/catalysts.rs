// ABOUTME: Database operations for catalyst prompt definitions
// ABOUTME: Owner-filtered CRUD; system catalysts are visible to all and immutable to users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Catalyst, Visibility};

/// Fields required to create a private catalyst
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCatalystRequest {
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered input descriptors
    pub inputs_json: JsonValue,
    /// Template string with `{name}` placeholders
    pub prompt_template: String,
}

/// Partial update applied by the owner
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCatalystRequest {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New input descriptors
    #[serde(default)]
    pub inputs_json: Option<JsonValue>,
    /// New template
    #[serde(default)]
    pub prompt_template: Option<String>,
}

/// Catalyst database operations
pub struct CatalystsManager {
    pool: SqlitePool,
}

impl CatalystsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a private catalyst owned by `owner_id`
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn create(
        &self,
        owner_id: &str,
        request: &CreateCatalystRequest,
    ) -> AppResult<Catalyst> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let inputs_json = request.inputs_json.to_string();

        sqlx::query(
            r"
            INSERT INTO catalysts (id, owner_id, name, description, inputs_json, prompt_template, visibility, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'private', $7)
            ",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&inputs_json)
        .bind(&request.prompt_template)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to create catalyst: {e}")))?;

        Ok(Catalyst {
            id,
            owner_id: Some(owner_id.to_owned()),
            name: request.name.clone(),
            description: request.description.clone(),
            inputs_json: request.inputs_json.clone(),
            prompt_template: request.prompt_template.clone(),
            visibility: Visibility::Private,
            created_at: now,
        })
    }

    /// Fetch a catalyst the caller may run: system-visible or owned
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn get_visible(&self, id: &str, user_id: &str) -> AppResult<Option<Catalyst>> {
        let row = sqlx::query(
            r"
            SELECT id, owner_id, name, description, inputs_json, prompt_template, visibility, created_at
            FROM catalysts
            WHERE id = $1 AND (visibility = 'system' OR owner_id = $2)
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to get catalyst: {e}")))?;

        row.map(row_to_catalyst).transpose()
    }

    /// List the caller's catalysts plus all system catalysts, newest first
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn list_visible(&self, user_id: &str) -> AppResult<Vec<Catalyst>> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, name, description, inputs_json, prompt_template, visibility, created_at
            FROM catalysts
            WHERE visibility = 'system' OR owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to list catalysts: {e}")))?;

        rows.into_iter().map(row_to_catalyst).collect()
    }

    /// Apply a partial update to a catalyst the caller owns
    ///
    /// System catalysts never match the ownership filter, so they stay
    /// immutable to end users.
    ///
    /// # Errors
    /// Returns `NotFound` when the catalyst does not exist or is not owned
    /// by the caller.
    pub async fn update(
        &self,
        id: &str,
        owner_id: &str,
        request: &UpdateCatalystRequest,
    ) -> AppResult<Catalyst> {
        let inputs_json = request.inputs_json.as_ref().map(ToString::to_string);

        let result = sqlx::query(
            r"
            UPDATE catalysts
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                inputs_json = COALESCE($5, inputs_json),
                prompt_template = COALESCE($6, prompt_template)
            WHERE id = $1 AND owner_id = $2 AND visibility = 'private'
            ",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&inputs_json)
        .bind(&request.prompt_template)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to update catalyst: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Catalyst not found"));
        }

        self.get_visible(id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Catalyst not found"))
    }

    /// Delete a catalyst the caller owns
    ///
    /// # Errors
    /// Returns `NotFound` when the catalyst does not exist or is not owned
    /// by the caller.
    pub async fn delete(&self, id: &str, owner_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM catalysts
            WHERE id = $1 AND owner_id = $2 AND visibility = 'private'
            ",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to delete catalyst: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Catalyst not found"));
        }
        Ok(())
    }

    /// Insert a system catalyst (seeding/admin path, not exposed over HTTP)
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn create_system(
        &self,
        name: &str,
        prompt_template: &str,
        inputs_json: &JsonValue,
    ) -> AppResult<Catalyst> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO catalysts (id, owner_id, name, description, inputs_json, prompt_template, visibility, created_at)
            VALUES ($1, NULL, $2, NULL, $3, $4, 'system', $5)
            ",
        )
        .bind(&id)
        .bind(name)
        .bind(inputs_json.to_string())
        .bind(prompt_template)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to create system catalyst: {e}")))?;

        Ok(Catalyst {
            id,
            owner_id: None,
            name: name.to_owned(),
            description: None,
            inputs_json: inputs_json.clone(),
            prompt_template: prompt_template.to_owned(),
            visibility: Visibility::System,
            created_at: now,
        })
    }
}

/// Map a database row to a [`Catalyst`]
fn row_to_catalyst(row: sqlx::sqlite::SqliteRow) -> AppResult<Catalyst> {
    let inputs_raw: String = row.get("inputs_json");
    let inputs_json = serde_json::from_str(&inputs_raw)
        .map_err(|e| AppError::database(format!("corrupt inputs_json: {e}")))?;
    let visibility: String = row.get("visibility");

    Ok(Catalyst {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        inputs_json,
        prompt_template: row.get("prompt_template"),
        visibility: Visibility::from_str_or_private(&visibility),
        created_at: row.get("created_at"),
    })
}
