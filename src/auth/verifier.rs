// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT verification against a key set.
//!
//! Verification is stateless: the only input besides the token is the key
//! set and the fixed [`VerificationSettings`]. The accepted algorithm list
//! is pinned here and never taken from the token header.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::claims::{ClaimSet, RawClaims};
use super::extractor::BearerToken;
use super::jwks::KeySet;
use super::AuthError;

/// The only signing algorithm accepted.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 1] = [Algorithm::RS256];

/// Expected issuer and audience for every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSettings {
    issuer: String,
    audience: String,
}

impl VerificationSettings {
    /// # Arguments
    /// - `issuer`: e.g. `https://tenant.us.auth0.com/` (trailing slash included)
    /// - `audience`: the API identifier registered with the identity provider
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation
    }
}

/// Read the key ID from the unverified token header.
///
/// Rejects any header that does not assert RS256 before a key is looked up,
/// so an attacker cannot pick the algorithm the signature is checked with.
pub fn key_id(token: &BearerToken) -> Result<String, AuthError> {
    let header = decode_header(token.as_str()).map_err(|_| AuthError::UnparseableToken)?;

    if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
        return Err(AuthError::UnsupportedAlgorithm);
    }

    header.kid.ok_or(AuthError::MissingKeyId)
}

/// Verify the token's signature and claims against `keys`.
pub fn verify(
    token: &BearerToken,
    keys: &KeySet,
    settings: &VerificationSettings,
) -> Result<ClaimSet, AuthError> {
    let kid = key_id(token)?;

    let signing_key = keys.find(&kid).ok_or(AuthError::KeyNotFound)?;
    let (n, e) = signing_key.rsa_components().ok_or(AuthError::UnusableKey)?;
    let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|_| AuthError::UnusableKey)?;

    let token_data = decode::<RawClaims>(token.as_str(), &decoding_key, &settings.validation())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidClaimFormat(_) => AuthError::InvalidClaims,
            ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm,
            _ => AuthError::UnparseableToken,
        })?;

    let raw = token_data.claims;
    let exp = raw.exp.ok_or(AuthError::InvalidClaims)?;

    // The library accepts `exp == now`; a token is only valid strictly before it.
    if chrono::Utc::now().timestamp() >= exp {
        return Err(AuthError::TokenExpired);
    }

    Ok(ClaimSet::from_raw(raw, exp))
}
