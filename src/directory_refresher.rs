// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Background chain directory refresher.
//!
//! Reloads the chain list on a fixed interval so resolved profiles pick up
//! endpoint and prefix changes without a restart. The first sweep runs
//! immediately, which also warms the cache before the first request.
//!
//! Stops when the `CancellationToken` is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::providers::directory::DirectoryCache;

pub struct DirectoryRefresher {
    directory: Arc<DirectoryCache>,
    interval: Duration,
}

impl DirectoryRefresher {
    pub fn new(directory: Arc<DirectoryCache>, interval: Duration) -> Self {
        Self {
            directory,
            interval,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Directory refresher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Directory refresher shutting down");
                return;
            }

            if let Err(e) = self.directory.refresh().await {
                // Stale entries keep serving until the next sweep.
                warn!(error = %e, "Directory refresh failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Directory refresher shutting down");
                    return;
                }
            }
        }
    }
}
