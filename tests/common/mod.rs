// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared harness: a wiremock identity provider serving the fixture keys and
//! the full router configured against it.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coffee_shop_server::{
    api::router,
    auth::{AuthGuard, KeySetCache, VerificationSettings},
    config::{AppConfig, API_AUDIENCE_ENV, AUTH0_DOMAIN_ENV, JWKS_REFRESH_COOLDOWN_ENV},
    state::AppState,
    store::InMemoryStore,
};

pub const AUDIENCE: &str = "coffee-shop";
pub const KEY_ID: &str = "fixture-key-1";
pub const ROTATED_KEY_ID: &str = "fixture-key-2";

const KEY_1_PEM: &str = include_str!("../fixtures/signing_key_1.pem");
const KEY_2_PEM: &str = include_str!("../fixtures/signing_key_2.pem");
const PUBLIC_KEYS: &str = include_str!("../fixtures/public_keys.json");

pub const BARISTA: &[&str] = &["get:drinks", "get:drinks-detail"];
pub const MANAGER: &[&str] = &[
    "get:drinks",
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

fn fixture_for(kid: &str) -> &'static str {
    match kid {
        KEY_ID => "signing_key_1",
        ROTATED_KEY_ID => "signing_key_2",
        other => panic!("no fixture key {other}"),
    }
}

/// JWKS document containing the given fixture keys.
pub fn jwks(kids: &[&str]) -> Value {
    let public: Value = serde_json::from_str(PUBLIC_KEYS).expect("public key fixture parses");
    let keys: Vec<Value> = kids
        .iter()
        .map(|kid| {
            let key = &public[fixture_for(kid)];
            json!({"kty": "RSA", "kid": kid, "use": "sig", "alg": "RS256", "n": key["n"], "e": key["e"]})
        })
        .collect();
    json!({ "keys": keys })
}

pub async fn mount_jwks(server: &MockServer, kids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks(kids)))
        .mount(server)
        .await;
}

/// Identity provider plus an app configured from the same variables `main` reads.
pub struct TestApp {
    pub idp: MockServer,
    pub app: Router,
    pub issuer: String,
}

impl TestApp {
    /// App whose provider serves `kids`; pass an empty slice to mount keys later.
    pub async fn start(kids: &[&str], store: InMemoryStore) -> Self {
        let idp = MockServer::start().await;
        if !kids.is_empty() {
            mount_jwks(&idp, kids).await;
        }

        let uri = idp.uri();
        let config = AppConfig::from_lookup(|name| match name {
            AUTH0_DOMAIN_ENV => Some(uri.clone()),
            API_AUDIENCE_ENV => Some(AUDIENCE.to_string()),
            JWKS_REFRESH_COOLDOWN_ENV => Some("0".to_string()),
            _ => None,
        })
        .expect("test config loads");

        let keys = KeySetCache::with_timeout(config.jwks_url.clone(), config.jwks_fetch_timeout)
            .expect("client builds")
            .with_cache_ttl(config.jwks_cache_ttl)
            .with_refresh_cooldown(config.jwks_refresh_cooldown)
            .with_failure_backoff(config.jwks_failure_backoff)
            .with_retry(1, std::time::Duration::ZERO);
        let guard = AuthGuard::new(keys, VerificationSettings::new(config.issuer.clone(), config.audience));

        Self {
            app: router(AppState::new(store, guard)),
            issuer: config.issuer,
            idp,
        }
    }

    pub fn claims(&self, permissions: &[&str], exp_offset: i64) -> Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "iss": self.issuer,
            "aud": AUDIENCE,
            "sub": "auth0|manager",
            "iat": now,
            "exp": now + exp_offset,
            "permissions": permissions,
        })
    }

    /// Valid one-hour token with `permissions`, signed by the primary key.
    pub fn token(&self, permissions: &[&str]) -> String {
        sign(KEY_ID, &self.claims(permissions, 3600))
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn send_as(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(method, uri, Some(&format!("Bearer {token}")), body)
            .await
    }
}

pub fn sign(kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    sign_with_header(header, kid, claims)
}

pub fn sign_with_header(header: Header, signing_kid: &str, claims: &Value) -> String {
    let pem = match fixture_for(signing_kid) {
        "signing_key_1" => KEY_1_PEM,
        _ => KEY_2_PEM,
    };
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key parses");
    jsonwebtoken::encode(&header, claims, &key).expect("token signs")
}
