// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-route authorization guard.
//!
//! [`AuthGuard`] composes extraction, verification and the permission check.
//! [`AuthGuard::require`] turns it into a tower layer that wraps a single
//! handler with one required permission:
//!
//! ```rust,ignore
//! use axum::handler::Handler;
//!
//! let guard = AuthGuard::new(keys, settings);
//! Router::new().route(
//!     "/drinks",
//!     post(create_drink.layer(guard.require(POST_DRINKS))),
//! );
//! ```
//!
//! On success the [`ClaimSet`] is stored in the request extensions and the
//! handler receives it as its first argument. On failure the [`AuthError`]
//! becomes the response and the handler never runs.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::extractor::extract_bearer_token;
use super::jwks::KeySetCache;
use super::permissions::check_permission;
use super::verifier::{key_id, verify, VerificationSettings};
use super::{AuthError, ClaimSet};

/// Shared authorization pipeline.
#[derive(Clone)]
pub struct AuthGuard {
    keys: KeySetCache,
    settings: Arc<VerificationSettings>,
}

impl AuthGuard {
    pub fn new(keys: KeySetCache, settings: VerificationSettings) -> Self {
        Self {
            keys,
            settings: Arc::new(settings),
        }
    }

    /// The key set cache, for health checks.
    pub fn keys(&self) -> &KeySetCache {
        &self.keys
    }

    /// Authenticate the request and check `required` against its claims.
    ///
    /// Each stage's error is returned unchanged.
    pub async fn authorize(&self, headers: &HeaderMap, required: &str) -> Result<ClaimSet, AuthError> {
        let token = extract_bearer_token(headers)?;

        let kid = key_id(&token)?;
        let keys = self.keys.keys_for(&kid).await?;
        let claims = verify(&token, &keys, &self.settings)?;

        check_permission(required, &claims)?;

        tracing::debug!(subject = claims.subject(), permission = required, "Request authorized");
        Ok(claims)
    }

    /// Layer that guards a handler with `permission`.
    pub fn require(&self, permission: &'static str) -> RequirePermissionLayer {
        RequirePermissionLayer {
            guard: self.clone(),
            permission,
        }
    }
}

/// Tower layer produced by [`AuthGuard::require`].
#[derive(Clone)]
pub struct RequirePermissionLayer {
    guard: AuthGuard,
    permission: &'static str,
}

impl<S> Layer<S> for RequirePermissionLayer {
    type Service = RequirePermission<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermission {
            inner,
            guard: self.guard.clone(),
            permission: self.permission,
        }
    }
}

/// Service that authorizes each request before calling `inner`.
#[derive(Clone)]
pub struct RequirePermission<S> {
    inner: S,
    guard: AuthGuard,
    permission: &'static str,
}

impl<S> Service<Request> for RequirePermission<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // Call the service that was polled ready, leave the clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let guard = self.guard.clone();
        let permission = self.permission;
        Box::pin(async move {
            match guard.authorize(req.headers(), permission).await {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    inner.call(req).await
                }
                Err(auth_error) => Ok(auth_error.into_response()),
            }
        })
    }
}
