// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified JWT claims.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;

use super::AuthError;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Audience::Single(aud) => vec![aud],
            Audience::Many(auds) => auds,
        }
    }
}

/// Token payload as it comes off the wire, before it becomes a [`ClaimSet`].
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    pub(crate) iss: String,
    #[serde(default)]
    pub(crate) aud: Option<Audience>,
    /// Optional here so a missing `exp` surfaces as a claims failure from
    /// validation rather than a parse failure
    #[serde(default)]
    pub(crate) exp: Option<i64>,
    #[serde(default)]
    pub(crate) iat: Option<i64>,
    #[serde(default)]
    pub(crate) sub: String,
    /// `None` when the provider did not add RBAC permissions to the token
    #[serde(default)]
    pub(crate) permissions: Option<Vec<String>>,
}

/// Decoded and validated token payload.
///
/// Only produced by [`verify`](super::verifier::verify), so holding one
/// means issuer, audience, expiry and signature have all been checked.
/// Handlers behind the auth guard take it as their first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    issuer: String,
    audience: Vec<String>,
    expires_at: i64,
    issued_at: Option<i64>,
    subject: String,
    permissions: Option<Vec<String>>,
}

impl ClaimSet {
    /// `exp` has already been required by validation; the verifier passes
    /// it in separately.
    pub(crate) fn from_raw(raw: RawClaims, expires_at: i64) -> Self {
        Self {
            issuer: raw.iss,
            audience: raw.aud.map(Audience::into_vec).unwrap_or_default(),
            expires_at,
            issued_at: raw.iat,
            subject: raw.sub,
            permissions: raw.permissions,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    /// Expiry (Unix timestamp).
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.issued_at
    }

    /// Canonical user ID (`sub`).
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Granted permissions, or `None` if the token has no `permissions` claim.
    pub fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn for_tests(subject: &str, permissions: Option<&[&str]>) -> Self {
        Self {
            issuer: "https://coffee.test/".to_string(),
            audience: vec!["drinks".to_string()],
            expires_at: i64::MAX,
            issued_at: None,
            subject: subject.to_string(),
            permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Hands a guarded handler the claims the guard stored on the request.
impl<S> FromRequestParts<S> for ClaimSet
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ClaimSet>().cloned().ok_or_else(|| {
            AuthError::InternalError(format!("no auth guard on {}", parts.uri.path()))
        })
    }
}
