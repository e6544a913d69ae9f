// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Multi-chain balance aggregation.
//!
//! One source address is re-encoded for every requested chain, each chain is
//! queried concurrently, and the per-chain snapshots are folded into
//! cross-chain totals. A chain that cannot be resolved or queried is reported
//! in the breakdown and contributes zero; only an undecodable source address
//! fails the whole request.
//!
//! - `fanout` - settle-all fan-out and per-call timeouts
//! - `chain` - per-chain snapshot
//! - `pool` - AMM pool-share valuation
//! - `totals` - cross-chain totalization

pub mod chain;
pub mod fanout;
pub mod pool;
pub mod totals;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use utoipa::ToSchema;

use crate::cosmos::address::{decode_address, derive_addresses, AddressError};
use crate::cosmos::denom::DenomExponents;
use crate::cosmos::ChainClientFactory;
use crate::models::{
    ChainBreakdown, ChainFailure, ChainProfile, CrossChainTotal, DerivedAddress, FailureKind,
    PoolPosition,
};
use crate::providers::directory::{DirectoryCache, ResolvedChain};
use crate::providers::osmosis::PoolMarketData;

use self::chain::{aggregate_chain, is_total_failure};
use self::pool::PoolValuator;
use self::totals::{totalize, ChainOutcome};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// No chain can be resolved without the directory.
    #[error("Chain directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Everything known about one address across the requested chains.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AccountBalances {
    pub address: String,
    pub totals: CrossChainTotal,
    pub breakdown: Vec<ChainBreakdown>,
}

/// Split a `c1,c2,...` list, dropping blanks and repeats.
pub fn parse_chain_list(raw: &str) -> Vec<String> {
    let mut chains: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !chains.iter().any(|seen| seen == name) {
            chains.push(name.to_string());
        }
    }
    chains
}

pub struct BalanceAggregator {
    directory: Arc<DirectoryCache>,
    clients: Arc<dyn ChainClientFactory>,
    market: Arc<dyn PoolMarketData>,
    amm_chain: String,
    timeout: Duration,
}

impl BalanceAggregator {
    pub fn new(
        directory: Arc<DirectoryCache>,
        clients: Arc<dyn ChainClientFactory>,
        market: Arc<dyn PoolMarketData>,
        amm_chain: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            clients,
            market,
            amm_chain: amm_chain.into(),
            timeout,
        }
    }

    pub fn amm_chain(&self) -> &str {
        &self.amm_chain
    }

    /// Whether a chain selection covers the AMM chain. No selection does.
    pub fn selects_amm_chain(&self, chains: &[String]) -> bool {
        chains.is_empty() || chains.iter().any(|c| *c == self.amm_chain)
    }

    /// Aggregate balances of `address` over `chains`, in request order.
    pub async fn balances(
        &self,
        address: &str,
        chains: &[String],
    ) -> Result<AccountBalances, AggregateError> {
        let source = decode_address(address)?;

        self.directory
            .summaries()
            .await
            .map_err(|e| AggregateError::DirectoryUnavailable(e.to_string()))?;

        let resolved = self.directory.resolve_all(chains).await;
        let profiles: Vec<ChainProfile> = resolved
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.profile.clone())
            .collect();

        let exponents = exponent_table(&resolved);
        let derived: HashMap<String, DerivedAddress> = derive_addresses(address, &profiles)?
            .into_iter()
            .map(|d| (d.chain_name.clone(), d))
            .collect();

        let outcomes = join_all(
            resolved
                .into_iter()
                .map(|r| self.outcome_for(r, &derived, &exponents)),
        );

        let amm_target = derived.get(&self.amm_chain);
        let pools = async {
            match amm_target {
                Some(target) => self.value_pools(target).await,
                None => Vec::new(),
            }
        };

        let (outcomes, pools) = tokio::join!(outcomes, pools);
        let (totals, breakdown) = totalize(&outcomes, pools);

        tracing::info!(
            prefix = %source.prefix,
            chains = chains.len(),
            failed = breakdown.iter().filter(|b| b.failure.is_some()).count(),
            "Aggregated balances"
        );

        Ok(AccountBalances {
            address: address.trim().to_string(),
            totals,
            breakdown,
        })
    }

    /// Pool positions of `address` on the AMM chain. `chains` restricts the
    /// lookup: when non-empty it must name the AMM chain.
    pub async fn pool_positions(
        &self,
        address: &str,
        chains: &[String],
    ) -> Result<Vec<PoolPosition>, AggregateError> {
        decode_address(address)?;

        if !self.selects_amm_chain(chains) {
            return Ok(Vec::new());
        }

        let resolved = match self.directory.resolve(&self.amm_chain).await {
            Ok(resolved) => resolved,
            Err(failure) => {
                tracing::warn!(chain = %failure.chain, error = %failure.message, "AMM chain unavailable");
                return Ok(Vec::new());
            }
        };

        let target = derive_addresses(address, std::slice::from_ref(&resolved.profile))?;
        match target.first() {
            Some(target) => Ok(self.value_pools(target).await),
            None => Ok(Vec::new()),
        }
    }

    async fn outcome_for(
        &self,
        resolved: Result<ResolvedChain, ChainFailure>,
        derived: &HashMap<String, DerivedAddress>,
        exponents: &DenomExponents,
    ) -> ChainOutcome {
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(failure) => return ChainOutcome::failed(failure),
        };
        let profile = &resolved.profile;

        let Some(target) = derived.get(&profile.name) else {
            return ChainOutcome::failed(ChainFailure::new(
                &profile.name,
                FailureKind::ChainUnsupported,
                "no address derived for chain",
            ));
        };

        let client = match self.clients.connect(profile) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(chain = %profile.name, error = %e, "Cannot build chain client");
                return ChainOutcome::failed(ChainFailure::new(&profile.name, e.kind(), e.to_string()));
            }
        };

        let snapshot = aggregate_chain(target, client.as_ref(), exponents, self.timeout).await;

        if is_total_failure(&snapshot) {
            if let Some(first) = snapshot.failures.first() {
                return ChainOutcome::unreachable(
                    &profile.native_denom,
                    &target.address,
                    ChainFailure::new(&profile.name, first.kind, first.message.clone()),
                );
            }
        }

        ChainOutcome::reported(&profile.name, &profile.native_denom, snapshot)
    }

    async fn value_pools(&self, target: &DerivedAddress) -> Vec<PoolPosition> {
        let client = match self.clients.connect(&target.profile) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(chain = %target.chain_name, error = %e, "Cannot build AMM chain client");
                return Vec::new();
            }
        };

        PoolValuator::new(client.as_ref(), self.market.as_ref(), self.timeout)
            .positions(target)
            .await
    }
}

fn exponent_table(resolved: &[Result<ResolvedChain, ChainFailure>]) -> DenomExponents {
    let chains: Vec<&ResolvedChain> = resolved.iter().filter_map(|r| r.as_ref().ok()).collect();
    DenomExponents::from_profiles(chains.iter().map(|c| &c.profile))
        .with_assets(chains.iter().flat_map(|c| c.assets.iter()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmos::ChainClientError;
    use crate::models::{ChainStatus, RawCoin};
    use crate::providers::directory::ProfileSettings;
    use crate::test_support::{asset, summary, MockChain, MockDirectory, MockFactory, MockMarket};

    const COSMOS_ADDR: &str = "cosmos1xzzwtpwa9x4dmzgrp25g5s3e9n79a8wz7ymq7x";
    const OSMO_ADDR: &str = "osmo1xzzwtpwa9x4dmzgrp25g5s3e9n79a8wzklgsg5";

    fn directory() -> Arc<DirectoryCache> {
        let directory = MockDirectory::default()
            .with_chain(summary("cosmoshub", "uatom", 6), "cosmos", vec![asset("uatom", "ATOM", 6)])
            .with_chain(summary("osmosis", "uosmo", 6), "osmo", vec![asset("uosmo", "OSMO", 6)])
            .with_chain(summary("juno", "ujuno", 6), "juno", vec![asset("ujuno", "JUNO", 6)]);
        Arc::new(DirectoryCache::new(
            Arc::new(directory),
            ProfileSettings::default(),
            Duration::from_secs(60),
        ))
    }

    fn aggregator(factory: MockFactory, market: MockMarket) -> BalanceAggregator {
        BalanceAggregator::new(
            directory(),
            Arc::new(factory),
            Arc::new(market),
            "osmosis",
            Duration::from_secs(1),
        )
    }

    fn chains(list: &str) -> Vec<String> {
        parse_chain_list(list)
    }

    #[test]
    fn chain_list_parsing() {
        assert_eq!(
            parse_chain_list(" cosmoshub, osmosis,,cosmoshub "),
            vec!["cosmoshub".to_string(), "osmosis".to_string()]
        );
        assert!(parse_chain_list("").is_empty());
    }

    #[tokio::test]
    async fn staked_only_on_osmosis() {
        let factory = MockFactory::default()
            .with_chain("cosmoshub", MockChain::default())
            .with_chain(
                "osmosis",
                MockChain::default().with_delegations(vec![("osmovaloper1a", "1000000")]),
            );

        let balances = aggregator(factory, MockMarket::default())
            .balances(COSMOS_ADDR, &chains("cosmoshub,osmosis"))
            .await
            .unwrap();

        assert_eq!(
            balances.totals.staked,
            std::collections::BTreeMap::from([("uosmo".to_string(), 1.0)])
        );
        let hub = balances.breakdown[0].snapshot.as_ref().unwrap();
        assert_eq!(hub.staked.total, 0.0);
        assert_eq!(balances.breakdown[1].address.as_deref(), Some(OSMO_ADDR));
    }

    #[tokio::test]
    async fn unknown_chain_is_flagged_and_others_populated() {
        let factory = MockFactory::default()
            .with_chain("cosmoshub", MockChain::default().with_balances(vec![RawCoin::new("uatom", "3000000")]))
            .with_chain("osmosis", MockChain::default().with_balances(vec![RawCoin::new("uosmo", "1500000")]));

        let balances = aggregator(factory, MockMarket::default())
            .balances(COSMOS_ADDR, &chains("cosmoshub,atlantis,osmosis"))
            .await
            .unwrap();

        assert_eq!(balances.breakdown.len(), 3);
        assert_eq!(balances.breakdown[1].chain, "atlantis");
        assert_eq!(balances.breakdown[1].status, ChainStatus::Failed);
        assert_eq!(
            balances.breakdown[1].failure.as_ref().unwrap().kind,
            FailureKind::ChainUnsupported
        );
        assert_eq!(balances.totals.native["atlantis"], 0.0);
        assert_eq!(balances.totals.native["cosmoshub"], 3.0);
        assert_eq!(balances.totals.native["osmosis"], 1.5);
    }

    #[tokio::test]
    async fn failing_chain_does_not_affect_others() {
        let down = ChainClientError::NetworkUnavailable("connection refused".into());
        let factory = MockFactory::default()
            .with_chain(
                "juno",
                MockChain::default()
                    .with_balances_error(down.clone())
                    .with_delegations_error(down.clone())
                    .with_rewards_error(down),
            )
            .with_chain("cosmoshub", MockChain::default().with_balances(vec![RawCoin::new("uatom", "1000000")]));

        let balances = aggregator(factory, MockMarket::default())
            .balances(COSMOS_ADDR, &chains("juno,cosmoshub"))
            .await
            .unwrap();

        assert_eq!(balances.breakdown[0].status, ChainStatus::Failed);
        assert_eq!(
            balances.breakdown[0].failure.as_ref().unwrap().kind,
            FailureKind::NetworkUnavailable
        );
        assert!(balances.breakdown[0].address.as_deref().unwrap().starts_with("juno1"));
        assert_eq!(balances.breakdown[0].native_denom.as_deref(), Some("ujuno"));
        assert!(balances.breakdown[0].snapshot.is_none());
        assert_eq!(balances.breakdown[1].status, ChainStatus::Ok);
        assert_eq!(balances.totals.total["uatom"], 1.0);
    }

    #[tokio::test]
    async fn client_construction_failure_is_per_chain() {
        let factory = MockFactory::default()
            .with_chain("cosmoshub", MockChain::default())
            .with_connect_error("osmosis", ChainClientError::InvalidEndpoint("bad url".into()));

        let balances = aggregator(factory, MockMarket::default())
            .balances(COSMOS_ADDR, &chains("cosmoshub,osmosis"))
            .await
            .unwrap();

        assert_eq!(balances.breakdown[0].status, ChainStatus::Ok);
        assert_eq!(
            balances.breakdown[1].failure.as_ref().unwrap().kind,
            FailureKind::ChainUnsupported
        );
    }

    #[tokio::test]
    async fn unreachable_directory_is_fatal() {
        let directory = MockDirectory::default();
        directory.fail_chain_list();
        let aggregator = BalanceAggregator::new(
            Arc::new(DirectoryCache::new(
                Arc::new(directory),
                ProfileSettings::default(),
                Duration::from_secs(60),
            )),
            Arc::new(MockFactory::default()),
            Arc::new(MockMarket::default()),
            "osmosis",
            Duration::from_secs(1),
        );

        let result = aggregator
            .balances(COSMOS_ADDR, &chains("cosmoshub,osmosis"))
            .await;
        assert!(matches!(result, Err(AggregateError::DirectoryUnavailable(_))));
    }

    #[tokio::test]
    async fn invalid_address_is_fatal() {
        let result = aggregator(MockFactory::default(), MockMarket::default())
            .balances("cosmos1notvalid", &chains("cosmoshub"))
            .await;
        assert!(matches!(result, Err(AggregateError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn amm_chain_contributes_pool_positions() {
        let factory = MockFactory::default().with_chain(
            "osmosis",
            MockChain::default()
                .with_balances(vec![RawCoin::new("gamm/pool/1", "2000000000000000000")])
                .with_supply("gamm/pool/1", "200000000000000000000"),
        );
        let market = MockMarket::default().with_pair("1", "ATOM", "OSMO", 1_000_000.0);

        let balances = aggregator(factory, market)
            .balances(COSMOS_ADDR, &chains("osmosis"))
            .await
            .unwrap();

        assert_eq!(balances.totals.pools.len(), 1);
        assert_eq!(balances.totals.pools[0].pair_symbol, "ATOM/OSMO");
        assert_eq!(balances.totals.pool_locked["gamm/pool/1"], 2.0);
    }

    #[tokio::test]
    async fn pool_positions_require_amm_chain() {
        let factory = MockFactory::default().with_chain(
            "osmosis",
            MockChain::default()
                .with_balances(vec![RawCoin::new("gamm/pool/1", "2000000000000000000")])
                .with_supply("gamm/pool/1", "200000000000000000000"),
        );
        let market = MockMarket::default().with_pair("1", "ATOM", "OSMO", 1_000_000.0);
        let aggregator = aggregator(factory, market);

        let positions = aggregator
            .pool_positions(COSMOS_ADDR, &chains("osmosis,cosmoshub"))
            .await
            .unwrap();
        assert_eq!(positions.len(), 1);

        let none = aggregator
            .pool_positions(COSMOS_ADDR, &chains("cosmoshub"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
