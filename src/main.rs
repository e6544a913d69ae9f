// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use cosmos_balances::{
    api::router,
    config::{AppConfig, DEFAULT_LOG_FILTER},
    directory_refresher::DirectoryRefresher,
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();
    init_tracing(config.json_logs);

    let state = AppState::new(config.clone()).expect("Failed to build upstream clients");

    // Background directory refresh, stopped with the server.
    let shutdown = CancellationToken::new();
    let refresher = tokio::spawn(
        DirectoryRefresher::new(state.directory.clone(), config.directory_refresh)
            .run(shutdown.clone()),
    );

    let app = router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, amm_chain = %config.amm_chain, "Cosmos balance server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .expect("HTTP server failed");

    shutdown.cancel();
    if let Err(e) = refresher.await {
        tracing::warn!(error = %e, "Directory refresher did not stop cleanly");
    }
    tracing::info!("Server stopped");
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        }
        _ = shutdown.cancelled() => {}
    }
    tracing::info!("Shutting down");
    shutdown.cancel();
}
