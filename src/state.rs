// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::AuthGuard;
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub auth: AuthGuard,
}

impl AppState {
    pub fn new(store: InMemoryStore, auth: AuthGuard) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            auth,
        }
    }

    /// State whose key set lives at `jwks_url`, verified against the test
    /// issuer and audience.
    #[cfg(test)]
    pub(crate) fn for_tests(store: InMemoryStore, jwks_url: &str) -> Self {
        use crate::auth::testing::{TEST_AUDIENCE, TEST_ISSUER};
        use crate::auth::{KeySetCache, VerificationSettings};

        let keys = KeySetCache::with_timeout(jwks_url, std::time::Duration::from_secs(1))
            .expect("test client builds")
            .with_retry(1, std::time::Duration::ZERO)
            .with_refresh_cooldown(std::time::Duration::ZERO);
        Self::new(
            store,
            AuthGuard::new(keys, VerificationSettings::new(TEST_ISSUER, TEST_AUDIENCE)),
        )
    }
}
