// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory doubles for chain clients and upstream providers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::cosmos::address::derive_addresses;
use crate::cosmos::types::{DenomTrace, EpochInfo, OsmosisMintParams, StakingPool};
use crate::cosmos::{
    ChainClientError, ChainClientFactory, ChainQuery, DelegationEntry, ValidatorReward,
};
use crate::models::{ChainProfile, DerivedAddress, PriceQuote, RawCoin};
use crate::providers::coingecko::PriceProvider;
use crate::providers::directory::{
    ApiEndpoint, AssetList, BestApis, ChainData, ChainDirectory, ChainSummary, DenomUnit,
    DirectoryAsset,
};
use crate::providers::osmosis::{MarketPair, MarketToken, PoolMarketData};
use crate::providers::ProviderError;
use crate::state::{AppState, Upstreams};

pub const SOURCE_ADDRESS: &str = "cosmos1xzzwtpwa9x4dmzgrp25g5s3e9n79a8wz7ymq7x";

pub fn profile(name: &str, prefix: &str, native_denom: &str, exponent: u32) -> ChainProfile {
    ChainProfile {
        name: name.to_string(),
        chain_id: None,
        address_prefix: prefix.to_string(),
        native_denom: native_denom.to_string(),
        decimal_exponent: exponent,
        rpc_endpoint: format!("https://rpc.{name}.example"),
        rest_endpoint: format!("https://lcd.{name}.example"),
        coingecko_id: None,
        reward_denom_offset: 0,
    }
}

/// [`SOURCE_ADDRESS`] re-encoded for a test chain.
pub fn derived(name: &str, prefix: &str, native_denom: &str, exponent: u32) -> DerivedAddress {
    derive_addresses(SOURCE_ADDRESS, &[profile(name, prefix, native_denom, exponent)])
        .unwrap()
        .remove(0)
}

pub fn summary(name: &str, denom: &str, decimals: u32) -> ChainSummary {
    ChainSummary {
        name: name.to_string(),
        chain_id: Some(format!("{name}-1")),
        pretty_name: None,
        denom: Some(denom.to_string()),
        decimals: Some(decimals),
        coingecko_id: Some(name.to_string()),
        best_apis: BestApis {
            rpc: vec![ApiEndpoint {
                address: format!("https://rpc.{name}.example"),
            }],
            rest: vec![ApiEndpoint {
                address: format!("https://lcd.{name}.example"),
            }],
        },
    }
}

pub fn asset(base: &str, symbol: &str, decimals: u32) -> DirectoryAsset {
    let display = symbol.to_lowercase();
    DirectoryAsset {
        base: base.to_string(),
        display: Some(display.clone()),
        symbol: symbol.to_string(),
        denom_units: vec![
            DenomUnit {
                denom: base.to_string(),
                exponent: 0,
            },
            DenomUnit {
                denom: display,
                exponent: decimals,
            },
        ],
        coingecko_id: None,
        logo_uris: None,
    }
}

// =============================================================================
// Chain
// =============================================================================

/// Scripted chain. Unset balance-like queries answer with an empty list.
#[derive(Debug, Default)]
pub struct MockChain {
    pub balances: Option<Result<Vec<RawCoin>, ChainClientError>>,
    pub delegations: Option<Result<Vec<DelegationEntry>, ChainClientError>>,
    pub rewards: Option<Result<Vec<ValidatorReward>, ChainClientError>>,
    pub locked: Option<Result<Vec<RawCoin>, ChainClientError>>,
    pub traces: HashMap<String, Result<DenomTrace, ChainClientError>>,
    pub supplies: HashMap<String, RawCoin>,
    pub staking_pool: Option<StakingPool>,
    pub inflation: Option<f64>,
    pub mint_params: Option<OsmosisMintParams>,
    pub epochs: Vec<EpochInfo>,
    pub epoch_provisions: Option<f64>,
    pub hang_rewards: bool,
}

impl MockChain {
    pub fn with_balances(mut self, coins: Vec<RawCoin>) -> Self {
        self.balances = Some(Ok(coins));
        self
    }

    pub fn with_balances_error(mut self, error: ChainClientError) -> Self {
        self.balances = Some(Err(error));
        self
    }

    /// `(validator, amount)` pairs.
    pub fn with_delegations(mut self, entries: Vec<(&str, &str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(validator, amount)| DelegationEntry {
                validator: validator.to_string(),
                balance: RawCoin::new("native", amount),
            })
            .collect();
        self.delegations = Some(Ok(entries));
        self
    }

    pub fn with_delegations_error(mut self, error: ChainClientError) -> Self {
        self.delegations = Some(Err(error));
        self
    }

    /// `(validator, [(denom, amount)])` entries.
    pub fn with_rewards(mut self, entries: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(validator, coins)| ValidatorReward {
                validator: validator.to_string(),
                reward: coins
                    .into_iter()
                    .map(|(denom, amount)| RawCoin::new(denom, amount))
                    .collect(),
            })
            .collect();
        self.rewards = Some(Ok(entries));
        self
    }

    pub fn with_rewards_error(mut self, error: ChainClientError) -> Self {
        self.rewards = Some(Err(error));
        self
    }

    /// Rewards never answer.
    pub fn hanging_rewards(mut self) -> Self {
        self.hang_rewards = true;
        self
    }

    pub fn with_locked(mut self, coins: Vec<RawCoin>) -> Self {
        self.locked = Some(Ok(coins));
        self
    }

    pub fn with_locked_error(mut self, error: ChainClientError) -> Self {
        self.locked = Some(Err(error));
        self
    }

    pub fn with_trace(mut self, hash: &str, base_denom: &str) -> Self {
        self.traces.insert(
            hash.to_string(),
            Ok(DenomTrace {
                path: "transfer/channel-0".to_string(),
                base_denom: base_denom.to_string(),
            }),
        );
        self
    }

    pub fn with_trace_error(mut self, hash: &str, error: ChainClientError) -> Self {
        self.traces.insert(hash.to_string(), Err(error));
        self
    }

    pub fn with_supply(mut self, denom: &str, amount: &str) -> Self {
        self.supplies
            .insert(denom.to_string(), RawCoin::new(denom, amount));
        self
    }

    pub fn with_staking_pool(mut self, bonded: &str, not_bonded: &str) -> Self {
        self.staking_pool = Some(StakingPool {
            bonded_tokens: bonded.to_string(),
            not_bonded_tokens: not_bonded.to_string(),
        });
        self
    }

    pub fn with_inflation(mut self, inflation: f64) -> Self {
        self.inflation = Some(inflation);
        self
    }

    pub fn with_osmosis_mint(
        mut self,
        params: OsmosisMintParams,
        epochs: Vec<EpochInfo>,
        provisions: f64,
    ) -> Self {
        self.mint_params = Some(params);
        self.epochs = epochs;
        self.epoch_provisions = Some(provisions);
        self
    }
}

fn scripted<T: Clone>(
    reply: &Option<Result<Vec<T>, ChainClientError>>,
) -> Result<Vec<T>, ChainClientError> {
    reply.clone().unwrap_or_else(|| Ok(Vec::new()))
}

fn unsupported(query: &str) -> ChainClientError {
    ChainClientError::Unsupported(format!("{query} not scripted"))
}

#[async_trait]
impl ChainQuery for MockChain {
    async fn all_balances(&self, _address: &str) -> Result<Vec<RawCoin>, ChainClientError> {
        scripted(&self.balances)
    }

    async fn delegations(&self, _address: &str) -> Result<Vec<DelegationEntry>, ChainClientError> {
        scripted(&self.delegations)
    }

    async fn rewards(&self, _address: &str) -> Result<Vec<ValidatorReward>, ChainClientError> {
        if self.hang_rewards {
            std::future::pending::<()>().await;
        }
        scripted(&self.rewards)
    }

    async fn denom_trace(&self, hash: &str) -> Result<DenomTrace, ChainClientError> {
        self.traces.get(hash).cloned().unwrap_or_else(|| {
            Err(ChainClientError::MalformedResponse(format!(
                "no trace for {hash}"
            )))
        })
    }

    async fn supply_of(&self, denom: &str) -> Result<RawCoin, ChainClientError> {
        self.supplies
            .get(denom)
            .cloned()
            .ok_or_else(|| ChainClientError::MalformedResponse(format!("no supply for {denom}")))
    }

    async fn staking_pool(&self) -> Result<StakingPool, ChainClientError> {
        self.staking_pool
            .clone()
            .ok_or_else(|| unsupported("staking pool"))
    }

    async fn inflation(&self) -> Result<f64, ChainClientError> {
        self.inflation.ok_or_else(|| unsupported("inflation"))
    }

    async fn locked_coins(&self, _address: &str) -> Result<Vec<RawCoin>, ChainClientError> {
        scripted(&self.locked)
    }

    async fn osmosis_mint_params(&self) -> Result<OsmosisMintParams, ChainClientError> {
        self.mint_params
            .clone()
            .ok_or_else(|| unsupported("mint params"))
    }

    async fn osmosis_epochs(&self) -> Result<Vec<EpochInfo>, ChainClientError> {
        Ok(self.epochs.clone())
    }

    async fn osmosis_epoch_provisions(&self) -> Result<f64, ChainClientError> {
        self.epoch_provisions
            .ok_or_else(|| unsupported("epoch provisions"))
    }
}

/// Hands out scripted chains by profile name.
#[derive(Default)]
pub struct MockFactory {
    chains: HashMap<String, Arc<MockChain>>,
    connect_errors: HashMap<String, ChainClientError>,
}

impl MockFactory {
    pub fn with_chain(mut self, name: &str, chain: MockChain) -> Self {
        self.chains.insert(name.to_string(), Arc::new(chain));
        self
    }

    pub fn with_connect_error(mut self, name: &str, error: ChainClientError) -> Self {
        self.connect_errors.insert(name.to_string(), error);
        self
    }
}

impl ChainClientFactory for MockFactory {
    fn connect(&self, profile: &ChainProfile) -> Result<Arc<dyn ChainQuery>, ChainClientError> {
        if let Some(error) = self.connect_errors.get(&profile.name) {
            return Err(error.clone());
        }
        match self.chains.get(&profile.name) {
            Some(chain) => Ok(chain.clone() as Arc<dyn ChainQuery>),
            None => Err(ChainClientError::Unsupported(profile.name.clone())),
        }
    }
}

// =============================================================================
// Providers
// =============================================================================

#[derive(Default)]
pub struct MockDirectory {
    chains: Vec<ChainSummary>,
    prefixes: HashMap<String, String>,
    assets: HashMap<String, Vec<DirectoryAsset>>,
    fail_list: AtomicBool,
    list_calls: AtomicUsize,
    data_calls: AtomicUsize,
}

impl MockDirectory {
    pub fn with_chain(mut self, chain: ChainSummary, prefix: &str, assets: Vec<DirectoryAsset>) -> Self {
        self.prefixes.insert(chain.name.clone(), prefix.to_string());
        self.assets.insert(chain.name.clone(), assets);
        self.chains.push(chain);
        self
    }

    pub fn fail_chain_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn chain_list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn chain_data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainDirectory for MockDirectory {
    async fn chains(&self) -> Result<Vec<ChainSummary>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("directory unreachable".into()));
        }
        Ok(self.chains.clone())
    }

    async fn chain_data(&self, name: &str) -> Result<ChainData, ProviderError> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        self.prefixes
            .get(name)
            .map(|prefix| ChainData {
                bech32_prefix: prefix.clone(),
            })
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }

    async fn token_data(&self, name: &str) -> Result<AssetList, ProviderError> {
        self.assets
            .get(name)
            .map(|assets| AssetList {
                assets: assets.clone(),
            })
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }
}

#[derive(Default)]
pub struct MockMarket {
    tokens: Vec<MarketToken>,
    pairs: Vec<MarketPair>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl MockMarket {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_token(mut self, denom: &str, symbol: &str, price: f64, exponent: u32) -> Self {
        self.tokens.push(MarketToken {
            denom: denom.to_string(),
            symbol: symbol.to_string(),
            price: Some(price),
            exponent,
        });
        self
    }

    pub fn with_pair(mut self, pool_id: &str, base: &str, quote: &str, liquidity: f64) -> Self {
        self.pairs.push(MarketPair {
            pool_id: pool_id.to_string(),
            base_symbol: base.to_string(),
            quote_symbol: quote.to_string(),
            liquidity,
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T: Clone>(&self, data: &[T]) -> Result<Vec<T>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ProviderError::Request("market data unreachable".into()));
        }
        Ok(data.to_vec())
    }
}

#[async_trait]
impl PoolMarketData for MockMarket {
    async fn tokens(&self) -> Result<Vec<MarketToken>, ProviderError> {
        self.answer(&self.tokens)
    }

    async fn pairs(&self) -> Result<Vec<MarketPair>, ProviderError> {
        self.answer(&self.pairs)
    }
}

#[derive(Default)]
pub struct MockPrices {
    quotes: HashMap<String, PriceQuote>,
    calls: AtomicUsize,
}

impl MockPrices {
    pub fn with_quote(mut self, id: &str, usd: f64) -> Self {
        self.quotes.insert(
            id.to_string(),
            PriceQuote {
                usd: Some(usd),
                cad: None,
                eur: None,
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceProvider for MockPrices {
    async fn price(&self, id: &str) -> Result<PriceQuote, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

// =============================================================================
// Service
// =============================================================================

/// Directory listing cosmoshub, osmosis and juno.
pub fn standard_directory() -> MockDirectory {
    MockDirectory::default()
        .with_chain(summary("cosmoshub", "uatom", 6), "cosmos", vec![asset("uatom", "ATOM", 6)])
        .with_chain(summary("osmosis", "uosmo", 6), "osmo", vec![asset("uosmo", "OSMO", 6)])
        .with_chain(summary("juno", "ujuno", 6), "juno", vec![asset("ujuno", "JUNO", 6)])
}

/// Service state over in-memory upstreams.
pub fn app_state(
    directory: MockDirectory,
    factory: MockFactory,
    market: MockMarket,
    prices: Arc<MockPrices>,
) -> AppState {
    let config = AppConfig {
        query_timeout: std::time::Duration::from_secs(1),
        ..AppConfig::default()
    };
    AppState::with_upstreams(
        config,
        Upstreams {
            directory: Arc::new(directory),
            clients: Arc::new(factory),
            prices,
            market: Arc::new(market),
        },
    )
}
