// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Auth0 bearer-token verification and RBAC permission enforcement for the
//! drink API.
//!
//! ## Auth Flow
//!
//! 1. Frontend signs the user in with Auth0 and requests an access token
//!    for this API's audience
//! 2. Frontend sends `Authorization: Bearer <JWT>`
//! 3. Server, per guarded route:
//!    - Extracts the bearer token ([`extractor`])
//!    - Reads `kid` from the unverified header, rejecting any algorithm
//!      but RS256 ([`verifier`])
//!    - Looks the key up in the cached JWKS, refetching once on a miss
//!      ([`jwks`])
//!    - Verifies signature, `exp`, `iss` and `aud` ([`verifier`])
//!    - Checks the route's permission against the `permissions` claim
//!      ([`permissions`])
//! 4. The handler runs with the [`ClaimSet`]; any failure is an
//!    [`AuthError`] response
//!
//! ## Security
//!
//! - The accepted algorithm list is fixed, never read from the token
//! - Expiry uses no clock skew allowance
//! - Error bodies never include token contents or provider responses

pub mod claims;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod jwks;
pub mod permissions;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::ClaimSet;
pub use error::AuthError;
pub use extractor::{extract_bearer_token, BearerToken};
pub use guard::{AuthGuard, RequirePermissionLayer};
pub use jwks::{KeySet, KeySetCache, KeySetError, SigningKey};
pub use permissions::check_permission;
pub use verifier::{verify, VerificationSettings};
