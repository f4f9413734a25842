// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction from the `Authorization` header.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Raw compact JWT taken from a bearer header. Not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BearerToken {
    fn from(value: &str) -> Self {
        BearerToken(value.to_string())
    }
}

impl AsRef<str> for BearerToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pull the bearer token out of the request headers.
///
/// The scheme is matched case-insensitively and the header must be exactly
/// `<scheme> <token>` once split on whitespace.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::AuthorizationHeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = auth_header.split_whitespace().collect();

    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::MalformedHeader),
        [] => Err(AuthError::MalformedHeader),
        [_] => Err(AuthError::IncompleteHeader),
        [_, token] => Ok(BearerToken::from(*token)),
        _ => Err(AuthError::ExcessHeaderParts),
    }
}
