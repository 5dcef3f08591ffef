// ABOUTME: Per-user daily run quota enforcement on UTC calendar-day boundaries
// ABOUTME: Pro accounts bypass the limit; free accounts are counted against run history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Quota guard
//!
//! Admits or denies a new run based on how many runs the user already has
//! recorded in the current UTC calendar day. Concurrent requests can both
//! read the same count and both pass; the daily limit is a soft cap, not an
//! exact one.

use tracing::debug;

use crate::config::environment::QuotaConfig;
use crate::database::RunsManager;
use crate::errors::{AppError, AppResult};

/// Daily run limit enforcement
pub struct QuotaGuard {
    daily_limit: u32,
}

impl QuotaGuard {
    /// Build from quota configuration
    #[must_use]
    pub const fn new(config: &QuotaConfig) -> Self {
        Self {
            daily_limit: config.daily_run_limit,
        }
    }

    /// The configured daily limit
    #[must_use]
    pub const fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Admit or deny a new run for the user
    ///
    /// Pro users are always admitted. Free users are admitted while their
    /// run count for the current UTC day is strictly below the limit.
    ///
    /// # Errors
    /// Returns `DailyLimitReached` on denial, or a database error when the
    /// count query fails.
    pub async fn check(&self, runs: &RunsManager, user_id: &str, is_pro: bool) -> AppResult<()> {
        if is_pro {
            return Ok(());
        }

        let used = runs.count_today_utc(user_id).await?;
        debug!(user_id, used, limit = self.daily_limit, "quota check");

        if used >= i64::from(self.daily_limit) {
            return Err(AppError::DailyLimitReached {
                limit: self.daily_limit,
            });
        }
        Ok(())
    }
}
