// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed RSA test keys and token builders for unit tests.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::extractor::BearerToken;
use super::jwks::{KeySet, SigningKey};

pub const TEST_ISSUER: &str = "https://coffee.test/";
pub const TEST_AUDIENCE: &str = "drinks";
pub const TEST_KEY_ID: &str = "test-key-1";
pub const TEST_KEY_ID_2: &str = "test-key-2";

const KEY_1_PEM: &str = include_str!("../../tests/fixtures/signing_key_1.pem");
const KEY_2_PEM: &str = include_str!("../../tests/fixtures/signing_key_2.pem");
const PUBLIC_KEYS: &str = include_str!("../../tests/fixtures/public_keys.json");

/// Fixture file stem holding the key pair for `kid`.
fn fixture_for(kid: &str) -> &'static str {
    match kid {
        TEST_KEY_ID => "signing_key_1",
        TEST_KEY_ID_2 => "signing_key_2",
        other => panic!("no test key {other}"),
    }
}

fn pem_for(kid: &str) -> &'static str {
    match fixture_for(kid) {
        "signing_key_1" => KEY_1_PEM,
        _ => KEY_2_PEM,
    }
}

/// Public half of the test key with the given ID.
pub fn signing_key(kid: &str) -> SigningKey {
    let keys: Value = serde_json::from_str(PUBLIC_KEYS).expect("public key fixture parses");
    let public = &keys[fixture_for(kid)];
    SigningKey::rsa(
        kid,
        public["n"].as_str().expect("fixture modulus"),
        public["e"].as_str().expect("fixture exponent"),
    )
}

pub fn key_set(kids: &[&str]) -> KeySet {
    KeySet {
        keys: kids.iter().map(|kid| signing_key(kid)).collect(),
    }
}

/// Standard claims for the test issuer/audience, expiring `exp_offset`
/// seconds from now.
pub fn claims_for(permissions: &[&str], exp_offset: i64) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "sub": "auth0|barista",
        "iat": now,
        "exp": now + exp_offset,
        "permissions": permissions,
    })
}

/// Sign with key `kid` and name it in the header.
pub fn sign(kid: &str, claims: &Value) -> BearerToken {
    sign_as(kid, kid, claims)
}

/// Sign with key `signing_kid` but put `header_kid` in the header.
pub fn sign_as(signing_kid: &str, header_kid: &str, claims: &Value) -> BearerToken {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(header_kid.to_string());
    encode_with(header, pem_for(signing_kid), claims)
}

/// Sign with key 1 using a caller-built header.
pub fn sign_with_header(header: Header, claims: &Value) -> BearerToken {
    encode_with(header, KEY_1_PEM, claims)
}

fn encode_with(header: Header, pem: &str, claims: &Value) -> BearerToken {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("test key parses");
    let token = jsonwebtoken::encode(&header, claims, &key).expect("test token signs");
    BearerToken::from(token.as_str())
}

mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};

    fn verifies(public_kid: &str, token: &BearerToken) -> bool {
        let key = signing_key(public_kid);
        let (n, e) = key.rsa_components().expect("rsa fixture");
        let decoding = DecodingKey::from_rsa_components(n, e).expect("fixture components decode");
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[TEST_AUDIENCE]);
        jsonwebtoken::decode::<Value>(token.as_str(), &decoding, &validation).is_ok()
    }

    #[test]
    fn public_fixture_matches_private_keys() {
        let claims = claims_for(&[], 60);
        for (kid, other) in [(TEST_KEY_ID, TEST_KEY_ID_2), (TEST_KEY_ID_2, TEST_KEY_ID)] {
            let token = sign(kid, &claims);
            assert!(verifies(kid, &token), "{kid} verifies its own tokens");
            assert!(!verifies(other, &token), "{other} rejects tokens from {kid}");
        }
    }
}
