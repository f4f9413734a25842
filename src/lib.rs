// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coffee Shop Server - Drink menu API with RBAC bearer-token auth
//!
//! Every drink endpoint requires an Auth0-issued RS256 access token carrying
//! the route's permission in its `permissions` claim.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification and permission enforcement (Auth0 JWT)
//! - `store` - In-memory drink store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
