// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use coffee_shop_server::{
    api::router,
    auth::{AuthGuard, KeySetCache, VerificationSettings},
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    store::InMemoryStore,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match LogFormat::from_env() {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn wait_for_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
    token.cancel();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let keys = match KeySetCache::with_timeout(config.jwks_url.clone(), config.jwks_fetch_timeout) {
        Ok(keys) => keys
            .with_cache_ttl(config.jwks_cache_ttl)
            .with_refresh_cooldown(config.jwks_refresh_cooldown)
            .with_failure_backoff(config.jwks_failure_backoff),
        Err(e) => {
            error!(error = %e, "Failed to build JWKS client");
            return ExitCode::FAILURE;
        }
    };
    let guard = AuthGuard::new(
        keys,
        VerificationSettings::new(config.issuer.clone(), config.audience.clone()),
    );

    // Warm the key cache; requests will retry on their own if this fails.
    if let Err(e) = guard.keys().refresh().await {
        tracing::warn!(error = %e, jwks_url = %config.jwks_url, "Initial JWKS fetch failed");
    }

    let store = if config.seed_sample_drink {
        info!("Seeding sample drink");
        InMemoryStore::with_sample_drink()
    } else {
        InMemoryStore::new()
    };
    let app = router(AppState::new(store, guard));

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.bind_addr, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addr = %config.bind_addr,
        issuer = %config.issuer,
        audience = %config.audience,
        "Coffee shop server listening (docs at /docs)"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    match served {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
