// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - Keys are cached for a configurable TTL
//! - At most one fetch is in flight; callers that queue behind it reuse
//!   whatever it stored instead of hitting the network again
//! - A `kid` miss triggers one re-fetch, unless the cached set is younger
//!   than the refresh cooldown
//! - Each request is bounded by a timeout and retried a fixed number of
//!   times before failing with [`KeySetError`]
//! - A failed fetch fails every caller queued behind it, and no new fetch
//!   starts until the failure backoff has passed
//!
//! ## Usage
//!
//! Build one `KeySetCache` at startup and hand clones to the auth guard.
//! Clones share the same cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

/// Default cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default outbound request timeout.
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default minimum age of the cached set before a `kid` miss re-fetches.
const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

const DEFAULT_FETCH_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Default quiet period after a failed fetch.
const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(5);

/// One public key published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key type (`RSA` for every key this service can use)
    pub kty: String,
    /// Key ID, matched against the token header's `kid`
    #[serde(default)]
    pub kid: Option<String>,
    /// Intended usage (`sig`)
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Algorithm the provider declares for this key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl SigningKey {
    /// Build an RSA signing key entry.
    pub fn rsa(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid: Some(kid.into()),
            usage: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
            n: Some(n.into()),
            e: Some(e.into()),
        }
    }

    /// Modulus and exponent, if this is an RSA key usable for signatures.
    pub fn rsa_components(&self) -> Option<(&str, &str)> {
        if self.kty != "RSA" {
            return None;
        }
        if matches!(self.usage.as_deref(), Some(usage) if usage != "sig") {
            return None;
        }
        if matches!(self.alg.as_deref(), Some(alg) if alg != "RS256") {
            return None;
        }
        Some((self.n.as_deref()?, self.e.as_deref()?))
    }
}

/// The identity provider's full key set, as published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<SigningKey>,
}

impl KeySet {
    /// Find the key with the given ID.
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// Failure to load the key set from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum KeySetError {
    #[error("JWKS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0} from JWKS endpoint")]
    Status(reqwest::StatusCode),

    #[error("JWKS response was malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("JWKS fetch failed {0:?} ago, not retrying yet")]
    RecentFailure(Duration),
}

/// Cache entry.
struct CacheEntry {
    keys: Arc<KeySet>,
    fetched_at: Instant,
    generation: u64,
}

/// A cached key set together with the fetch it came from.
struct Snapshot {
    keys: Arc<KeySet>,
    generation: u64,
    age: Duration,
}

/// JWKS cache shared by every request.
#[derive(Clone)]
pub struct KeySetCache {
    /// JWKS URL
    jwks_url: String,
    cache_ttl: Duration,
    refresh_cooldown: Duration,
    fetch_attempts: u32,
    retry_backoff: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    failure_backoff: Duration,
    /// Serializes fetches so concurrent misses share one request. Holds the
    /// time of the last failed fetch.
    refresh_lock: Arc<Mutex<Option<Instant>>>,
    client: reqwest::Client,
}

impl KeySetCache {
    /// Create a cache for the given JWKS endpoint.
    ///
    /// # Arguments
    /// - `jwks_url`: e.g. `https://tenant.us.auth0.com/.well-known/jwks.json`
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, KeySetError> {
        Self::with_timeout(jwks_url, DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a cache whose outbound requests give up after `timeout`.
    pub fn with_timeout(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySetError::Client(e.to_string()))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(None)),
            client,
        })
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set how old the cached set must be before a `kid` miss re-fetches.
    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    /// Set the retry policy for a single fetch.
    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.fetch_attempts = attempts.max(1);
        self.retry_backoff = backoff;
        self
    }

    /// Set how long after a failed fetch callers fail fast instead of
    /// fetching again.
    pub fn with_failure_backoff(mut self, backoff: Duration) -> Self {
        self.failure_backoff = backoff;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Current key set, served from cache while it is fresh.
    pub async fn get_keys(&self) -> Result<Arc<KeySet>, KeySetError> {
        Ok(self.snapshot().await?.keys)
    }

    /// Key set that should contain `kid`.
    ///
    /// When the cached set lacks `kid`, re-fetches once (subject to the
    /// cooldown) and returns the newer set. The caller still has to look the
    /// key up: a set without it means the key is genuinely unknown.
    pub async fn keys_for(&self, kid: &str) -> Result<Arc<KeySet>, KeySetError> {
        let snapshot = self.snapshot().await?;
        if snapshot.keys.find(kid).is_some() {
            return Ok(snapshot.keys);
        }

        if snapshot.age < self.refresh_cooldown {
            tracing::debug!(kid, "Key ID not in recently fetched JWKS, not refetching");
            return Ok(snapshot.keys);
        }

        tracing::info!(kid, "Key ID not in cached JWKS, refetching");
        Ok(self.refresh_after(Some(snapshot.generation)).await?.keys)
    }

    /// Force a fetch, replacing the cached set.
    pub async fn refresh(&self) -> Result<(), KeySetError> {
        let seen = self.cache.read().await.as_ref().map(|entry| entry.generation);
        self.refresh_after(seen).await?;
        Ok(())
    }

    /// Check if a key set is currently cached and fresh.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        matches!(&*cache, Some(entry) if entry.fetched_at.elapsed() < self.cache_ttl)
    }

    async fn snapshot(&self) -> Result<Snapshot, KeySetError> {
        let seen = {
            let cache = self.cache.read().await;
            match &*cache {
                Some(entry) if entry.fetched_at.elapsed() < self.cache_ttl => {
                    return Ok(Snapshot {
                        keys: entry.keys.clone(),
                        generation: entry.generation,
                        age: entry.fetched_at.elapsed(),
                    });
                }
                Some(entry) => Some(entry.generation),
                None => None,
            }
        };

        self.refresh_after(seen).await
    }

    /// Fetch unless another caller already replaced generation `seen`, or a
    /// fetch failed, while we waited for the lock.
    async fn refresh_after(&self, seen: Option<u64>) -> Result<Snapshot, KeySetError> {
        let requested_at = Instant::now();
        let mut last_failure = self.refresh_lock.lock().await;

        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if Some(entry.generation) != seen && entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(Snapshot {
                        keys: entry.keys.clone(),
                        generation: entry.generation,
                        age: entry.fetched_at.elapsed(),
                    });
                }
            }
        }

        if let Some(failed_at) = *last_failure {
            if failed_at >= requested_at || failed_at.elapsed() < self.failure_backoff {
                return Err(KeySetError::RecentFailure(failed_at.elapsed()));
            }
        }

        let keys = match self.fetch_with_retry().await {
            Ok(keys) => Arc::new(keys),
            Err(e) => {
                *last_failure = Some(Instant::now());
                return Err(e);
            }
        };
        *last_failure = None;

        let mut cache = self.cache.write().await;
        let generation = cache.as_ref().map(|entry| entry.generation + 1).unwrap_or(1);
        *cache = Some(CacheEntry {
            keys: keys.clone(),
            fetched_at: Instant::now(),
            generation,
        });
        tracing::debug!(generation, keys = keys.keys.len(), "JWKS cache updated");

        Ok(Snapshot {
            keys,
            generation,
            age: Duration::ZERO,
        })
    }

    async fn fetch_with_retry(&self) -> Result<KeySet, KeySetError> {
        let mut attempt = 1;
        loop {
            match self.fetch_jwks().await {
                Ok(keys) => return Ok(keys),
                Err(e) if attempt < self.fetch_attempts => {
                    tracing::warn!(error = %e, attempt, "JWKS fetch failed, will retry");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetch the key set from the endpoint.
    async fn fetch_jwks(&self) -> Result<KeySet, KeySetError> {
        let response = self.client.get(&self.jwks_url).send().await?;

        if !response.status().is_success() {
            return Err(KeySetError::Status(response.status()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
