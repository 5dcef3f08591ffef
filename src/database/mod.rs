// ABOUTME: Core database management with idempotent schema setup for SQLite
// ABOUTME: Exposes per-table managers for catalysts, profiles, and run history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Database access layer
//!
//! One [`Database`] wraps the SQLite pool and hands out manager structs per
//! table. The schema is created idempotently at startup; all row access is
//! ownership-filtered in SQL.

/// Catalyst storage and ownership-filtered queries
pub mod catalysts;
/// Profile storage with lazy upsert
pub mod profiles;
/// Append-only run history and quota counting
pub mod runs;

pub use catalysts::{CatalystsManager, CreateCatalystRequest, UpdateCatalystRequest};
pub use profiles::{ProfilesManager, UpsertProfileRequest};
pub use runs::RunsManager;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::errors::{AppError, AppResult};

/// Database handle shared across the server
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run schema setup
    ///
    /// In-memory databases are pinned to a single connection so every query
    /// sees the same database.
    ///
    /// # Errors
    /// Returns a database error when the connection or schema setup fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| AppError::database(format!("failed to connect to {database_url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    /// Returns a database error when any statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS catalysts (
                id TEXT PRIMARY KEY,
                owner_id TEXT,
                name TEXT NOT NULL,
                description TEXT,
                inputs_json TEXT NOT NULL DEFAULT '[]',
                prompt_template TEXT NOT NULL,
                visibility TEXT NOT NULL DEFAULT 'private',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to create catalysts table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                domain TEXT,
                work_style TEXT,
                values_json TEXT NOT NULL DEFAULT '[]',
                plan TEXT NOT NULL DEFAULT 'free',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to create profiles table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS catalyst_runs (
                id TEXT PRIMARY KEY,
                catalyst_id TEXT,
                user_id TEXT,
                inputs_json TEXT NOT NULL DEFAULT '{}',
                output TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to create catalyst_runs table: {e}")))?;

        // Quota counting scans by user and day window.
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_catalyst_runs_user_created
            ON catalyst_runs (user_id, created_at)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to create runs index: {e}")))?;

        Ok(())
    }

    /// Catalyst table operations
    #[must_use]
    pub fn catalysts(&self) -> CatalystsManager {
        CatalystsManager::new(self.pool.clone())
    }

    /// Profile table operations
    #[must_use]
    pub fn profiles(&self) -> ProfilesManager {
        ProfilesManager::new(self.pool.clone())
    }

    /// Run history table operations
    #[must_use]
    pub fn runs(&self) -> RunsManager {
        RunsManager::new(self.pool.clone())
    }
}
