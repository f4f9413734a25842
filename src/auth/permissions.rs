// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RBAC permission enforcement.
//!
//! Permissions are free-form strings the identity provider puts in the
//! token's `permissions` claim. Role-to-permission assignment happens at the
//! provider; this service only checks membership.

use super::{AuthError, ClaimSet};

/// List drinks (short form).
pub const GET_DRINKS: &str = "get:drinks";
/// List drinks with full recipes.
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
/// Create a drink.
pub const POST_DRINKS: &str = "post:drinks";
/// Update a drink.
pub const PATCH_DRINKS: &str = "patch:drinks";
/// Delete a drink.
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Check that `claims` grants `required`.
///
/// A token with no `permissions` claim at all is a provider misconfiguration
/// (RBAC not enabled for the API), reported separately from a denial.
pub fn check_permission(required: &str, claims: &ClaimSet) -> Result<(), AuthError> {
    let granted = claims.permissions().ok_or(AuthError::PermissionsClaimMissing)?;

    if granted.iter().any(|permission| permission == required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
