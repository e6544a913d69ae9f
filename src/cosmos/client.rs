// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cosmos chain query client.
//!
//! [`ChainQuery`] is the read surface the aggregator depends on; [`LcdClient`]
//! implements it over the Cosmos SDK REST gateway. Calls never retry: a
//! failure is reported once and the caller decides what to do with it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::types::*;
use crate::models::{ChainProfile, FailureKind, RawCoin};

/// Coins requested per balance page.
const BALANCE_PAGE_LIMIT: usize = 1000;

/// Pages followed before a balance listing is cut short.
const MAX_BALANCE_PAGES: usize = 20;

/// One delegation of the queried account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationEntry {
    pub validator: String,
    pub balance: RawCoin,
}

/// Pending rewards from one validator. Amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorReward {
    pub validator: String,
    pub reward: Vec<RawCoin>,
}

/// Errors that can occur while querying a chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Query not supported: {0}")]
    Unsupported(String),
}

impl ChainClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ChainClientError::InvalidEndpoint(_) | ChainClientError::Unsupported(_) => {
                FailureKind::ChainUnsupported
            }
            ChainClientError::NetworkUnavailable(_) => FailureKind::NetworkUnavailable,
            ChainClientError::Timeout(_) => FailureKind::Timeout,
            ChainClientError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// Read-only queries against one chain.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn all_balances(&self, address: &str) -> Result<Vec<RawCoin>, ChainClientError>;

    async fn delegations(&self, address: &str) -> Result<Vec<DelegationEntry>, ChainClientError>;

    async fn rewards(&self, address: &str) -> Result<Vec<ValidatorReward>, ChainClientError>;

    /// Resolve the hash part of an `ibc/<hash>` denom.
    async fn denom_trace(&self, hash: &str) -> Result<DenomTrace, ChainClientError>;

    async fn supply_of(&self, denom: &str) -> Result<RawCoin, ChainClientError>;

    async fn staking_pool(&self) -> Result<StakingPool, ChainClientError>;

    /// Current annual inflation as a fraction (0.07 = 7%).
    async fn inflation(&self) -> Result<f64, ChainClientError>;

    /// Coins locked in the Osmosis lockup module.
    async fn locked_coins(&self, _address: &str) -> Result<Vec<RawCoin>, ChainClientError> {
        Err(ChainClientError::Unsupported("lockup module".to_string()))
    }

    async fn osmosis_mint_params(&self) -> Result<OsmosisMintParams, ChainClientError> {
        Err(ChainClientError::Unsupported("osmosis mint module".to_string()))
    }

    async fn osmosis_epochs(&self) -> Result<Vec<EpochInfo>, ChainClientError> {
        Err(ChainClientError::Unsupported("osmosis epochs module".to_string()))
    }

    async fn osmosis_epoch_provisions(&self) -> Result<f64, ChainClientError> {
        Err(ChainClientError::Unsupported("osmosis mint module".to_string()))
    }
}

/// Builds a [`ChainQuery`] for a resolved chain profile.
pub trait ChainClientFactory: Send + Sync {
    fn connect(&self, profile: &ChainProfile) -> Result<Arc<dyn ChainQuery>, ChainClientError>;
}

/// Factory sharing one HTTP connection pool across every chain client.
#[derive(Clone)]
pub struct LcdClientFactory {
    http: Client,
}

impl LcdClientFactory {
    /// Create a factory whose clients time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ChainClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ChainClientError::NetworkUnavailable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { http })
    }
}

impl ChainClientFactory for LcdClientFactory {
    fn connect(&self, profile: &ChainProfile) -> Result<Arc<dyn ChainQuery>, ChainClientError> {
        let client = LcdClient::new(&profile.rest_endpoint, self.http.clone())?;
        Ok(Arc::new(client))
    }
}

/// Cosmos SDK REST gateway client for one chain.
#[derive(Debug, Clone)]
pub struct LcdClient {
    base_url: String,
    http: Client,
}

impl LcdClient {
    pub fn new(rest_endpoint: &str, http: Client) -> Result<Self, ChainClientError> {
        let url: url::Url = rest_endpoint
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidEndpoint(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ChainClientError::InvalidEndpoint(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        Ok(Self {
            base_url: rest_endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ChainClientError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NOT_IMPLEMENTED {
            return Err(ChainClientError::Unsupported(format!(
                "HTTP {status} from {url}"
            )));
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChainClientError::NetworkUnavailable(format!(
                "HTTP {status} from {url}"
            )));
        }
        if !status.is_success() {
            return Err(ChainClientError::MalformedResponse(format!(
                "HTTP {status} from {url}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ChainClientError::Timeout(url.clone())
            } else {
                ChainClientError::MalformedResponse(format!("{url}: {e}"))
            }
        })
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> ChainClientError {
    if error.is_timeout() {
        ChainClientError::Timeout(url.to_string())
    } else {
        ChainClientError::NetworkUnavailable(format!("{url}: {error}"))
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, ChainClientError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ChainClientError::MalformedResponse(format!("{field} is not a number: {raw}")))
}

#[async_trait]
impl ChainQuery for LcdClient {
    async fn all_balances(&self, address: &str) -> Result<Vec<RawCoin>, ChainClientError> {
        let path = format!("/cosmos/bank/v1beta1/balances/{address}");
        let limit = BALANCE_PAGE_LIMIT.to_string();

        let mut balances = Vec::new();
        let mut next_key: Option<String> = None;
        for _ in 0..MAX_BALANCE_PAGES {
            let mut query = vec![("pagination.limit", limit.as_str())];
            if let Some(key) = next_key.as_deref() {
                query.push(("pagination.key", key));
            }

            let page: BalancesResponse = self.get_json(&path, &query).await?;
            balances.extend(page.balances);

            next_key = page
                .pagination
                .as_ref()
                .and_then(PageResponse::next)
                .map(str::to_string);
            if next_key.is_none() {
                return Ok(balances);
            }
        }

        tracing::warn!(
            address = %address,
            pages = MAX_BALANCE_PAGES,
            coins = balances.len(),
            "Balance listing truncated"
        );
        Ok(balances)
    }

    async fn delegations(&self, address: &str) -> Result<Vec<DelegationEntry>, ChainClientError> {
        let path = format!("/cosmos/staking/v1beta1/delegations/{address}");
        let response: DelegationsResponse = self.get_json(&path, &[]).await?;
        Ok(response
            .delegation_responses
            .into_iter()
            .map(|d| DelegationEntry {
                validator: d.delegation.validator_address,
                balance: d.balance,
            })
            .collect())
    }

    async fn rewards(&self, address: &str) -> Result<Vec<ValidatorReward>, ChainClientError> {
        let path = format!("/cosmos/distribution/v1beta1/delegators/{address}/rewards");
        let response: RewardsResponse = self.get_json(&path, &[]).await?;
        Ok(response
            .rewards
            .into_iter()
            .map(|r| ValidatorReward {
                validator: r.validator_address,
                reward: r.reward,
            })
            .collect())
    }

    async fn denom_trace(&self, hash: &str) -> Result<DenomTrace, ChainClientError> {
        let path = format!("/ibc/apps/transfer/v1/denom_traces/{hash}");
        let response: DenomTraceResponse = self.get_json(&path, &[]).await?;
        Ok(response.denom_trace)
    }

    async fn supply_of(&self, denom: &str) -> Result<RawCoin, ChainClientError> {
        let response: SupplyResponse = self
            .get_json("/cosmos/bank/v1beta1/supply/by_denom", &[("denom", denom)])
            .await?;
        Ok(response.amount)
    }

    async fn staking_pool(&self) -> Result<StakingPool, ChainClientError> {
        let response: StakingPoolResponse =
            self.get_json("/cosmos/staking/v1beta1/pool", &[]).await?;
        Ok(response.pool)
    }

    async fn inflation(&self) -> Result<f64, ChainClientError> {
        let response: InflationResponse =
            self.get_json("/cosmos/mint/v1beta1/inflation", &[]).await?;
        parse_decimal("inflation", &response.inflation)
    }

    async fn locked_coins(&self, address: &str) -> Result<Vec<RawCoin>, ChainClientError> {
        let path = format!("/osmosis/lockup/v1beta1/account_locked_coins/{address}");
        let response: LockedCoinsResponse = self.get_json(&path, &[]).await?;
        Ok(response.coins)
    }

    async fn osmosis_mint_params(&self) -> Result<OsmosisMintParams, ChainClientError> {
        let response: OsmosisMintParamsResponse =
            self.get_json("/osmosis/mint/v1beta1/params", &[]).await?;
        Ok(response.params)
    }

    async fn osmosis_epochs(&self) -> Result<Vec<EpochInfo>, ChainClientError> {
        let response: EpochsResponse = self.get_json("/osmosis/epochs/v1beta1/epochs", &[]).await?;
        Ok(response.epochs)
    }

    async fn osmosis_epoch_provisions(&self) -> Result<f64, ChainClientError> {
        let response: EpochProvisionsResponse = self
            .get_json("/osmosis/mint/v1beta1/epoch_provisions", &[])
            .await?;
        parse_decimal("epoch_provisions", &response.epoch_provisions)
    }
}
