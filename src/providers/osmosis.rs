// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Osmosis AMM market data (token prices and pool pair liquidity).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, http_client, ProviderError};

/// A token with a market listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketToken {
    pub denom: String,
    pub symbol: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub exponent: u32,
}

/// Liquidity summary of one pool.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketPair {
    pub pool_id: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    /// Pool liquidity in USD.
    pub liquidity: f64,
}

impl MarketPair {
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base_symbol, self.quote_symbol)
    }
}

#[async_trait]
pub trait PoolMarketData: Send + Sync {
    async fn tokens(&self) -> Result<Vec<MarketToken>, ProviderError>;

    async fn pairs(&self) -> Result<Vec<MarketPair>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct PairsSummary {
    #[serde(default)]
    data: Vec<PairRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PoolId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct PairRecord {
    pool_id: PoolId,
    base_symbol: String,
    quote_symbol: String,
    #[serde(default)]
    liquidity: f64,
}

impl From<PairRecord> for MarketPair {
    fn from(record: PairRecord) -> Self {
        let pool_id = match record.pool_id {
            PoolId::Number(id) => id.to_string(),
            PoolId::Text(id) => id,
        };
        Self {
            pool_id,
            base_symbol: record.base_symbol,
            quote_symbol: record.quote_symbol,
            liquidity: record.liquidity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsmosisMarketClient {
    base_url: String,
    http: Client,
}

impl OsmosisMarketClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl PoolMarketData for OsmosisMarketClient {
    async fn tokens(&self) -> Result<Vec<MarketToken>, ProviderError> {
        let url = format!("{}/tokens/v2/all", self.base_url);
        get_json(&self.http, &url, &[]).await
    }

    async fn pairs(&self) -> Result<Vec<MarketPair>, ProviderError> {
        let url = format!("{}/pairs/v1/summary", self.base_url);
        let summary: PairsSummary = get_json(&self.http, &url, &[]).await?;
        Ok(summary.data.into_iter().map(MarketPair::from).collect())
    }
}
