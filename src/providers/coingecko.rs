// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CoinGecko simple-price client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{get_json, http_client, ProviderError};
use crate::models::PriceQuote;

/// Fiat currencies quoted for every id.
pub const VS_CURRENCIES: &str = "usd,cad,eur";

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Quote one market id (e.g. `cosmos`, `osmosis`).
    async fn price(&self, id: &str) -> Result<PriceQuote, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    http: Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    async fn price(&self, id: &str) -> Result<PriceQuote, ProviderError> {
        let url = format!("{}/simple/price", self.base_url);
        let mut quotes: HashMap<String, PriceQuote> =
            get_json(&self.http, &url, &[("ids", id), ("vs_currencies", VS_CURRENCIES)]).await?;

        quotes
            .remove(id)
            .ok_or_else(|| ProviderError::NotFound(format!("no price for `{id}`")))
    }
}
