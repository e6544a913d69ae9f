// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upstream data providers.
//!
//! - `directory` - chain registry (cosmos.directory) and the profile cache
//! - `coingecko` - fiat price quotes
//! - `osmosis` - AMM token and pair market data

pub mod coingecko;
pub mod directory;
pub mod osmosis;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::models::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    #[error("Provider response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Request(_) => FailureKind::NetworkUnavailable,
            ProviderError::Timeout(_) => FailureKind::Timeout,
            ProviderError::InvalidResponse(_) => FailureKind::MalformedResponse,
            ProviderError::NotFound(_) => FailureKind::ChainUnsupported,
        }
    }
}

/// Build the HTTP client shared by a provider.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let response = http.get(url).query(query).send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(format!("GET {url}"))
        } else {
            ProviderError::Request(format!("GET {url} failed: {e}"))
        }
    })?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(ProviderError::Request(format!("GET {url} returned {status}")));
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("GET {url} invalid JSON: {e}")))
}
