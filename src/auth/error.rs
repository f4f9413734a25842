// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Every stage of the bearer-token pipeline fails with an [`AuthError`].
//! Lower-level failures (header parsing, `jsonwebtoken` errors, key set
//! fetches) are replaced by a variant here, never wrapped, so nothing from
//! the identity provider or the crypto layer reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::jwks::KeySetError;

/// Authorization error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header on the request
    AuthorizationHeaderMissing,
    /// Header present but not a bearer scheme
    MalformedHeader,
    /// `Bearer` with no token after it
    IncompleteHeader,
    /// More than two whitespace-separated parts
    ExcessHeaderParts,
    /// Token header carries no `kid`
    MissingKeyId,
    /// Token header asserts an algorithm other than RS256
    UnsupportedAlgorithm,
    /// Token could not be decoded or its signature did not verify
    UnparseableToken,
    /// The key matching `kid` is not an RSA signing key
    UnusableKey,
    /// No key in the key set matches the token's `kid`
    KeyNotFound,
    /// The identity provider's key set could not be loaded
    KeySetUnavailable,
    /// Signature valid but `exp` is not in the future
    TokenExpired,
    /// Audience, issuer or a required claim is wrong
    InvalidClaims,
    /// Claim set has no `permissions` field
    PermissionsClaimMissing,
    /// `permissions` lacks the required permission
    PermissionDenied,
    /// A handler asked for claims on a route the guard does not cover
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: u16,
    code: &'static str,
    message: String,
}

impl AuthError {
    /// Machine-readable error code.
    ///
    /// Several variants share `invalid_header`; clients only need to know
    /// whether to fix the request, refresh the token or reconfigure.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthorizationHeaderMissing => "authorization_header_missing",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::IncompleteHeader
            | AuthError::ExcessHeaderParts
            | AuthError::MissingKeyId
            | AuthError::UnsupportedAlgorithm
            | AuthError::UnparseableToken
            | AuthError::UnusableKey => "invalid_header",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::KeySetUnavailable => "key_set_unavailable",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::PermissionDenied => "permission_denied",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthorizationHeaderMissing
            | AuthError::MalformedHeader
            | AuthError::IncompleteHeader
            | AuthError::ExcessHeaderParts
            | AuthError::MissingKeyId
            | AuthError::UnsupportedAlgorithm
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::UnparseableToken
            | AuthError::UnusableKey
            | AuthError::KeyNotFound
            | AuthError::PermissionsClaimMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable => StatusCode::BAD_GATEWAY,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::AuthorizationHeaderMissing => write!(f, "Authorization header is expected."),
            AuthError::MalformedHeader => {
                write!(f, "Authorization header must start with \"Bearer\".")
            }
            AuthError::IncompleteHeader => write!(f, "Header incomplete."),
            AuthError::ExcessHeaderParts => write!(f, "Authorization header has excess parts."),
            AuthError::MissingKeyId => write!(f, "Authorization malformed."),
            AuthError::UnsupportedAlgorithm => write!(f, "Token signing algorithm is not accepted."),
            AuthError::UnparseableToken => write!(f, "Unable to parse authentication token."),
            AuthError::UnusableKey | AuthError::KeyNotFound => {
                write!(f, "Unable to find the appropriate key.")
            }
            AuthError::KeySetUnavailable => {
                write!(f, "Unable to load signing keys from the identity provider.")
            }
            AuthError::TokenExpired => write!(f, "Token expired."),
            AuthError::InvalidClaims => {
                write!(f, "Incorrect claims. Please, check the audience and issuer.")
            }
            AuthError::PermissionsClaimMissing => write!(f, "Permissions not included in JWT."),
            AuthError::PermissionDenied => write!(f, "Permission not found."),
            AuthError::InternalError(_) => write!(f, "Internal authorization error."),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<KeySetError> for AuthError {
    fn from(err: KeySetError) -> Self {
        tracing::warn!(error = %err, "Signing key set unavailable");
        AuthError::KeySetUnavailable
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::InternalError(detail) = &self {
            tracing::error!(%detail, "Authorization pipeline misconfigured");
        } else {
            tracing::debug!(code = self.error_code(), status = status.as_u16(), "Request rejected");
        }

        let body = Json(AuthErrorBody {
            success: false,
            error: status.as_u16(),
            code: self.error_code(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
