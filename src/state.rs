// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::aggregate::BalanceAggregator;
use crate::cache::{CacheStore, LruCacheStore};
use crate::config::AppConfig;
use crate::cosmos::apr::AprCalculator;
use crate::cosmos::{ChainClientError, ChainClientFactory, LcdClientFactory};
use crate::providers::coingecko::{CoinGeckoClient, PriceProvider};
use crate::providers::directory::{
    ChainDirectory, CosmosDirectoryClient, DirectoryCache, ProfileSettings,
};
use crate::providers::osmosis::{OsmosisMarketClient, PoolMarketData};
use crate::providers::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("provider client: {0}")]
    Provider(#[from] ProviderError),
    #[error("chain client: {0}")]
    Chain(#[from] ChainClientError),
}

/// Upstream collaborators the service talks to.
pub struct Upstreams {
    pub directory: Arc<dyn ChainDirectory>,
    pub clients: Arc<dyn ChainClientFactory>,
    pub prices: Arc<dyn PriceProvider>,
    pub market: Arc<dyn PoolMarketData>,
}

impl Upstreams {
    /// HTTP clients for the configured endpoints.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let timeout = config.query_timeout;
        Ok(Self {
            directory: Arc::new(CosmosDirectoryClient::new(&config.directory_url, timeout)?),
            clients: Arc::new(LcdClientFactory::new(timeout)?),
            prices: Arc::new(CoinGeckoClient::new(&config.coingecko_url, timeout)?),
            market: Arc::new(OsmosisMarketClient::new(&config.pool_market_url, timeout)?),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<dyn CacheStore>,
    pub directory: Arc<DirectoryCache>,
    pub clients: Arc<dyn ChainClientFactory>,
    pub prices: Arc<dyn PriceProvider>,
    pub aggregator: Arc<BalanceAggregator>,
    pub apr: AprCalculator,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        let upstreams = Upstreams::from_config(&config)?;
        Ok(Self::with_upstreams(config, upstreams))
    }

    pub fn with_upstreams(config: AppConfig, upstreams: Upstreams) -> Self {
        let settings = ProfileSettings {
            rest_fallback: config.directory_rest_url.clone(),
            rpc_fallback: config.directory_rpc_url.clone(),
            reward_offsets: config.reward_offsets.clone(),
        };
        let directory = Arc::new(DirectoryCache::new(
            upstreams.directory,
            settings,
            config.ttl.chains,
        ));
        let aggregator = Arc::new(BalanceAggregator::new(
            directory.clone(),
            upstreams.clients.clone(),
            upstreams.market,
            config.amm_chain.clone(),
            config.query_timeout,
        ));

        Self {
            cache: Arc::new(LruCacheStore::new(config.cache_capacity)),
            apr: AprCalculator::new(config.query_timeout),
            directory,
            clients: upstreams.clients,
            prices: upstreams.prices,
            aggregator,
            config: Arc::new(config),
        }
    }
}
