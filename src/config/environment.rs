// ABOUTME: Environment-driven server configuration with typed sub-structs per concern
// ABOUTME: Parses LLM provider selection, auth, quota, database, and HTTP settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Environment configuration
//!
//! The server is configured exclusively through environment variables, read
//! once at startup via [`ServerConfig::from_env`]. Components receive their
//! configuration as explicit structs rather than reading the environment
//! themselves, so tests can construct configurations directly.

use std::env;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Default HTTP port when `HTTP_PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default free-tier daily run limit
const DEFAULT_DAILY_RUN_LIMIT: u32 = 3;

/// Default bound on identity verification before the fallback path is considered
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 3;

/// Default maximum output tokens requested from providers
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Supported upstream LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderType {
    /// OpenRouter chat-completions API
    OpenRouter,
    /// OpenAI chat-completions API
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google Gemini generateContent API
    Gemini,
}

impl LlmProviderType {
    /// Default model for this provider when `FLOW_LLM_MODEL` is unset
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenRouter => "deepseek/deepseek-chat-v3-0324",
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    /// Lowercase provider name as used in configuration
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }
}

impl FromStr for LlmProviderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(AppError::config(format!(
                "unsupported LLM provider '{other}' (expected openrouter, openai, anthropic, or gemini)"
            ))),
        }
    }
}

/// LLM provider selection and request parameters
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which upstream provider to dispatch to
    pub provider: LlmProviderType,
    /// Model identifier sent to the provider
    pub model: String,
    /// Maximum output tokens requested
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// API key; optional so tests and mock providers can omit it
    pub api_key: Option<String>,
}

impl LlmConfig {
    /// Build from `FLOW_LLM_*` environment variables
    ///
    /// # Errors
    /// Returns a configuration error for an unsupported provider name or
    /// unparseable numeric overrides.
    pub fn from_env() -> AppResult<Self> {
        let provider: LlmProviderType = env::var("FLOW_LLM_PROVIDER")
            .unwrap_or_else(|_| "openrouter".to_owned())
            .parse()?;
        let model = env::var("FLOW_LLM_MODEL")
            .unwrap_or_else(|_| provider.default_model().to_owned());
        let max_tokens = parse_env_or("FLOW_LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let temperature = parse_env_or("FLOW_LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        let api_key = env::var("FLOW_LLM_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            provider,
            model,
            max_tokens,
            temperature,
            api_key,
        })
    }

    /// API key or a configuration error naming the missing variable
    ///
    /// # Errors
    /// Returns `AppError::Config` when no key is configured.
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::config("FLOW_LLM_API_KEY is not set"))
    }
}

/// Identity verification settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    /// Bound on the verifying resolver before fallback is considered
    pub verify_timeout_secs: u64,
    /// Whether the unverified JWT-decode fallback may run at all.
    ///
    /// Local-development escape hatch only. Must stay disabled in any
    /// production deployment; see `auth::FallbackResolver`.
    pub allow_insecure_fallback: bool,
}

impl AuthConfig {
    /// Build from `FLOW_JWT_SECRET` and related environment variables
    ///
    /// # Errors
    /// Returns a configuration error when the JWT secret is missing.
    pub fn from_env() -> AppResult<Self> {
        let jwt_secret = env::var("FLOW_JWT_SECRET")
            .map_err(|_| AppError::config("FLOW_JWT_SECRET is not set"))?;
        let verify_timeout_secs =
            parse_env_or("FLOW_AUTH_TIMEOUT_SECS", DEFAULT_AUTH_TIMEOUT_SECS)?;
        let allow_insecure_fallback = env::var("FLOW_ALLOW_INSECURE_AUTH_FALLBACK")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            jwt_secret,
            verify_timeout_secs,
            allow_insecure_fallback,
        })
    }
}

/// Daily run quota settings
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Maximum runs per UTC calendar day for free-plan users
    pub daily_run_limit: u32,
}

impl QuotaConfig {
    /// Build from `FLOW_DAILY_RUN_LIMIT`
    ///
    /// # Errors
    /// Returns a configuration error when the override is unparseable.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            daily_run_limit: parse_env_or("FLOW_DAILY_RUN_LIMIT", DEFAULT_DAILY_RUN_LIMIT)?,
        })
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    pub http_port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// LLM provider settings
    pub llm: LlmConfig,
    /// Identity verification settings
    pub auth: AuthConfig,
    /// Daily quota settings
    pub quota: QuotaConfig,
}

impl ServerConfig {
    /// Load the full server configuration from the environment
    ///
    /// # Errors
    /// Returns a configuration error when required variables are missing or
    /// any override fails to parse.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            http_port: parse_env_or("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_owned()),
            llm: LlmConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            quota: QuotaConfig::from_env()?,
        })
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_env_or<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}
