// ABOUTME: Identity resolution from bearer tokens with verifying and fallback resolvers
// ABOUTME: Primary JWT verification bounded by a timeout; unverified decode behind an opt-in flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Auth resolver
//!
//! Two [`IdentityResolver`] implementations sit behind one interface:
//!
//! - [`VerifyingResolver`] validates the token signature against the shared
//!   identity-provider secret, bounded by a configurable timeout.
//! - [`FallbackResolver`] decodes the token payload **without signature
//!   verification**. It exists to route around a local-development limitation
//!   of the identity provider's elliptic-curve signing mode and must never be
//!   reachable in production. [`AuthResolver`] only consults it when
//!   `allow_insecure_fallback` is set, which defaults to off.
//!
//! Every failure surfaces as `AuthRequired` (401); callers fail closed.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

use crate::config::environment::AuthConfig;
use crate::errors::{AppError, AppResult};

/// Resolved caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Identity-provider user id (`sub` claim)
    pub user_id: String,
    /// Email, when the token carries one
    pub email: Option<String>,
}

/// Resolves a bearer token to an identity
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the token or fail with `AuthRequired`
    ///
    /// # Errors
    /// Returns `AppError::AuthRequired` for malformed, expired, or
    /// unverifiable tokens.
    async fn resolve(&self, token: &str) -> AppResult<AuthIdentity>;
}

/// JWT claims we consume from identity-provider tokens
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[allow(dead_code)]
    exp: i64,
}

/// Signature-verifying resolver (primary path)
pub struct VerifyingResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl VerifyingResolver {
    /// Build from the shared HS256 secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl IdentityResolver for VerifyingResolver {
    async fn resolve(&self, token: &str) -> AppResult<AuthIdentity> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::auth_required(format!("token verification failed: {e}")))?;
        Ok(AuthIdentity {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// Unverified payload-decoding resolver (dev-only escape hatch)
///
/// Accepts any well-formed 3-segment JWT and trusts its payload. Gated behind
/// `allow_insecure_fallback`; see the module docs for why it exists.
pub struct FallbackResolver;

#[async_trait]
impl IdentityResolver for FallbackResolver {
    async fn resolve(&self, token: &str) -> AppResult<AuthIdentity> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(AppError::auth_required(
                "token is not a well-formed JWT (expected 3 segments)",
            ));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1])
            .map_err(|e| AppError::auth_required(format!("token payload is not base64url: {e}")))?;

        #[derive(Deserialize)]
        struct UnverifiedPayload {
            sub: Option<String>,
            #[serde(default)]
            email: Option<String>,
        }

        let payload: UnverifiedPayload = serde_json::from_slice(&payload)
            .map_err(|e| AppError::auth_required(format!("token payload is not JSON: {e}")))?;

        let user_id = payload
            .sub
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::auth_required("token payload has no sub claim"))?;

        Ok(AuthIdentity {
            user_id,
            email: payload.email,
        })
    }
}

/// Composite resolver applying the primary/fallback policy
pub struct AuthResolver {
    primary: VerifyingResolver,
    fallback: FallbackResolver,
    verify_timeout: Duration,
    allow_insecure_fallback: bool,
}

impl AuthResolver {
    /// Build from auth configuration
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            primary: VerifyingResolver::new(&config.jwt_secret),
            fallback: FallbackResolver,
            verify_timeout: Duration::from_secs(config.verify_timeout_secs),
            allow_insecure_fallback: config.allow_insecure_fallback,
        }
    }

    /// Resolve a bearer token, applying the fallback policy
    ///
    /// The verifying resolver runs first, bounded by the configured timeout.
    /// On timeout or failure the unverified fallback runs only when
    /// explicitly enabled; otherwise the original failure propagates.
    ///
    /// # Errors
    /// Returns `AppError::AuthRequired` when no resolver accepts the token.
    pub async fn resolve(&self, token: &str) -> AppResult<AuthIdentity> {
        let primary_result =
            match tokio::time::timeout(self.verify_timeout, self.primary.resolve(token)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::auth_required(format!(
                    "token verification timed out after {}s",
                    self.verify_timeout.as_secs()
                ))),
            };

        match primary_result {
            Ok(identity) => Ok(identity),
            Err(primary_err) => {
                if self.allow_insecure_fallback {
                    warn!("token verification failed, using unverified decode fallback: {primary_err}");
                    self.fallback.resolve(token).await
                } else {
                    Err(primary_err)
                }
            }
        }
    }

    /// Resolve the caller from request headers
    ///
    /// # Errors
    /// Returns `AppError::AuthRequired` when the Authorization header is
    /// missing or the token fails to resolve.
    pub async fn resolve_headers(&self, headers: &HeaderMap) -> AppResult<AuthIdentity> {
        let token = extract_bearer_token(headers)?;
        self.resolve(token).await
    }
}

/// Pull the bearer token out of the Authorization header
///
/// # Errors
/// Returns `AppError::AuthRequired` when the header is missing or not a
/// Bearer scheme.
pub fn extract_bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::auth_required("missing Authorization: Bearer header"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unsigned_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.invalid-signature")
    }

    #[tokio::test]
    async fn fallback_extracts_sub_and_email() {
        let token = unsigned_token(&json!({"sub": "u1", "email": "a@b.com"}));
        let identity = FallbackResolver.resolve(&token).await.unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn fallback_rejects_two_segment_tokens() {
        let err = FallbackResolver.resolve("abc.def").await.unwrap_err();
        assert!(matches!(err, AppError::AuthRequired(_)));
    }

    #[tokio::test]
    async fn fallback_rejects_payload_without_sub() {
        let token = unsigned_token(&json!({"email": "a@b.com"}));
        let err = FallbackResolver.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthRequired(_)));
    }

    #[tokio::test]
    async fn composite_without_flag_never_falls_back() {
        let resolver = AuthResolver::new(&AuthConfig {
            jwt_secret: "secret".to_owned(),
            verify_timeout_secs: 3,
            allow_insecure_fallback: false,
        });
        // Payload is decodable but the signature is garbage, so the primary
        // fails and the disabled fallback must not rescue it.
        let token = unsigned_token(&json!({"sub": "u1", "exp": 4_102_444_800_i64}));
        let err = resolver.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthRequired(_)));
    }

    #[tokio::test]
    async fn composite_with_flag_falls_back_on_bad_signature() {
        let resolver = AuthResolver::new(&AuthConfig {
            jwt_secret: "secret".to_owned(),
            verify_timeout_secs: 3,
            allow_insecure_fallback: true,
        });
        let token = unsigned_token(&json!({"sub": "u1", "email": "a@b.com"}));
        let identity = resolver.resolve(&token).await.unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn bearer_extraction_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", "Bearer tok".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers).unwrap(), "tok");
    }
}
