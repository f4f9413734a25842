// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Identity provider domain (or `http(s)://` base URL) | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `JWKS_CACHE_TTL_SECS` | Key set cache lifetime | `300` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Outbound key set request timeout | `5` |
//! | `JWKS_REFRESH_COOLDOWN_SECS` | Minimum key set age before a kid miss refetches | `10` |
//! | `JWKS_FAILURE_BACKOFF_SECS` | Fail-fast period after a failed key set fetch | `5` |
//! | `SEED_SAMPLE_DRINK` | Insert the sample "water" drink at startup | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use url::Url;

/// Environment variable name for the identity provider domain.
///
/// Either a bare host (`tenant.eu.auth0.com`), which is served over HTTPS,
/// or a full base URL (`http://127.0.0.1:8081`).
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";

/// Environment variable name for the expected `aud` claim.
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const JWKS_REFRESH_COOLDOWN_ENV: &str = "JWKS_REFRESH_COOLDOWN_SECS";
pub const JWKS_FAILURE_BACKOFF_ENV: &str = "JWKS_FAILURE_BACKOFF_SECS";

/// Any non-empty value other than `0`/`false` seeds the sample drink.
pub const SEED_SAMPLE_DRINK_ENV: &str = "SEED_SAMPLE_DRINK";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_JWKS_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);
pub const DEFAULT_JWKS_FAILURE_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Path of the key set document below the provider base URL.
const JWKS_PATH: &str = ".well-known/jwks.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines, anything else the pretty formatter.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Provider base URL, always ending in `/`. Doubles as the expected issuer.
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwks_fetch_timeout: Duration,
    pub jwks_refresh_cooldown: Duration,
    pub jwks_failure_backoff: Duration,
    pub seed_sample_drink: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let domain = get(AUTH0_DOMAIN_ENV).ok_or(ConfigError::Missing(AUTH0_DOMAIN_ENV))?;
        let audience = get(API_AUDIENCE_ENV).ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;
        let base = provider_base_url(&domain)?;
        let jwks_url = base.join(JWKS_PATH).map_err(|e| ConfigError::Invalid {
            name: AUTH0_DOMAIN_ENV,
            reason: e.to_string(),
        })?;

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let ip: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            name: HOST_ENV,
            reason: format!("'{host}' is not an IP address"),
        })?;

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            issuer: base.to_string(),
            audience,
            jwks_url: jwks_url.to_string(),
            jwks_cache_ttl: secs(get(JWKS_CACHE_TTL_ENV), JWKS_CACHE_TTL_ENV, DEFAULT_JWKS_CACHE_TTL)?,
            jwks_fetch_timeout: secs(
                get(JWKS_FETCH_TIMEOUT_ENV),
                JWKS_FETCH_TIMEOUT_ENV,
                DEFAULT_JWKS_FETCH_TIMEOUT,
            )?,
            jwks_refresh_cooldown: secs(
                get(JWKS_REFRESH_COOLDOWN_ENV),
                JWKS_REFRESH_COOLDOWN_ENV,
                DEFAULT_JWKS_REFRESH_COOLDOWN,
            )?,
            jwks_failure_backoff: secs(
                get(JWKS_FAILURE_BACKOFF_ENV),
                JWKS_FAILURE_BACKOFF_ENV,
                DEFAULT_JWKS_FAILURE_BACKOFF,
            )?,
            seed_sample_drink: get(SEED_SAMPLE_DRINK_ENV)
                .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
                .unwrap_or(false),
        })
    }
}

fn provider_base_url(domain: &str) -> Result<Url, ConfigError> {
    let raw = if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    };

    let mut url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name: AUTH0_DOMAIN_ENV,
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Invalid {
            name: AUTH0_DOMAIN_ENV,
            reason: format!("'{domain}' is not a bare domain or base URL"),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn secs(raw: Option<String>, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn bare_domain_derives_https_urls() {
        let config = load(&[
            (AUTH0_DOMAIN_ENV, "coffee.eu.auth0.com"),
            (API_AUDIENCE_ENV, "drinks"),
        ])
        .unwrap();

        assert_eq!(config.issuer, "https://coffee.eu.auth0.com/");
        assert_eq!(config.jwks_url, "https://coffee.eu.auth0.com/.well-known/jwks.json");
        assert_eq!(config.audience, "drinks");
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.jwks_cache_ttl, DEFAULT_JWKS_CACHE_TTL);
        assert_eq!(config.jwks_fetch_timeout, DEFAULT_JWKS_FETCH_TIMEOUT);
        assert_eq!(config.jwks_refresh_cooldown, DEFAULT_JWKS_REFRESH_COOLDOWN);
        assert_eq!(config.jwks_failure_backoff, DEFAULT_JWKS_FAILURE_BACKOFF);
        assert!(!config.seed_sample_drink);
    }

    #[test]
    fn base_url_is_accepted() {
        let config = load(&[
            (AUTH0_DOMAIN_ENV, "http://127.0.0.1:8081"),
            (API_AUDIENCE_ENV, "drinks"),
        ])
        .unwrap();
        assert_eq!(config.issuer, "http://127.0.0.1:8081/");
        assert_eq!(config.jwks_url, "http://127.0.0.1:8081/.well-known/jwks.json");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            (AUTH0_DOMAIN_ENV, "coffee.auth0.com"),
            (API_AUDIENCE_ENV, "drinks"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "8080"),
            (JWKS_CACHE_TTL_ENV, "60"),
            (JWKS_FETCH_TIMEOUT_ENV, "2"),
            (JWKS_REFRESH_COOLDOWN_ENV, "0"),
            (JWKS_FAILURE_BACKOFF_ENV, "1"),
            (SEED_SAMPLE_DRINK_ENV, "1"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.jwks_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.jwks_fetch_timeout, Duration::from_secs(2));
        assert_eq!(config.jwks_refresh_cooldown, Duration::ZERO);
        assert_eq!(config.jwks_failure_backoff, Duration::from_secs(1));
        assert!(config.seed_sample_drink);
    }

    #[test]
    fn ipv6_host_is_accepted() {
        for (host, expected) in [("::", "[::]:5000"), ("::1", "[::1]:5000")] {
            let config = load(&[
                (AUTH0_DOMAIN_ENV, "coffee.auth0.com"),
                (API_AUDIENCE_ENV, "drinks"),
                (HOST_ENV, host),
            ])
            .unwrap();
            assert_eq!(config.bind_addr, expected.parse().unwrap());
        }

        let bad_host = load(&[
            (AUTH0_DOMAIN_ENV, "coffee.auth0.com"),
            (API_AUDIENCE_ENV, "drinks"),
            (HOST_ENV, "localhost"),
        ]);
        assert!(matches!(bad_host, Err(ConfigError::Invalid { name: HOST_ENV, .. })));
    }

    #[test]
    fn required_variables_are_enforced() {
        assert_eq!(
            load(&[(API_AUDIENCE_ENV, "drinks")]),
            Err(ConfigError::Missing(AUTH0_DOMAIN_ENV))
        );
        assert_eq!(
            load(&[(AUTH0_DOMAIN_ENV, "coffee.auth0.com"), (API_AUDIENCE_ENV, "  ")]),
            Err(ConfigError::Missing(API_AUDIENCE_ENV))
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_port = load(&[
            (AUTH0_DOMAIN_ENV, "coffee.auth0.com"),
            (API_AUDIENCE_ENV, "drinks"),
            (PORT_ENV, "http"),
        ]);
        assert!(matches!(bad_port, Err(ConfigError::Invalid { name: PORT_ENV, .. })));

        let bad_domain = load(&[
            (AUTH0_DOMAIN_ENV, "https://coffee.auth0.com/?tenant=1"),
            (API_AUDIENCE_ENV, "drinks"),
        ]);
        assert!(matches!(bad_domain, Err(ConfigError::Invalid { name: AUTH0_DOMAIN_ENV, .. })));
    }

    #[test]
    fn seed_flag_false_values() {
        for value in ["0", "false", "FALSE"] {
            let config = load(&[
                (AUTH0_DOMAIN_ENV, "coffee.auth0.com"),
                (API_AUDIENCE_ENV, "drinks"),
                (SEED_SAMPLE_DRINK_ENV, value),
            ])
            .unwrap();
            assert!(!config.seed_sample_drink, "{value}");
        }
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
    }
}
