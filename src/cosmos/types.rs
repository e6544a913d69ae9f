// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cosmos SDK REST (LCD) response types.
//!
//! Only the fields the aggregator reads are modelled; everything else in the
//! gateway JSON is ignored by serde.

use serde::Deserialize;

use crate::models::RawCoin;

#[derive(Debug, Deserialize)]
pub struct BalancesResponse {
    #[serde(default)]
    pub balances: Vec<RawCoin>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

/// Cursor of a paginated list query.
#[derive(Debug, Default, Deserialize)]
pub struct PageResponse {
    /// Opaque key of the next page; absent or empty on the last page.
    #[serde(default)]
    pub next_key: Option<String>,
}

impl PageResponse {
    pub fn next(&self) -> Option<&str> {
        self.next_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct DelegationsResponse {
    #[serde(default)]
    pub delegation_responses: Vec<DelegationResponse>,
}

#[derive(Debug, Deserialize)]
pub struct DelegationResponse {
    pub delegation: Delegation,
    pub balance: RawCoin,
}

#[derive(Debug, Deserialize)]
pub struct Delegation {
    pub validator_address: String,
}

#[derive(Debug, Deserialize)]
pub struct RewardsResponse {
    #[serde(default)]
    pub rewards: Vec<ValidatorRewardResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorRewardResponse {
    pub validator_address: String,
    #[serde(default)]
    pub reward: Vec<RawCoin>,
}

#[derive(Debug, Deserialize)]
pub struct DenomTraceResponse {
    pub denom_trace: DenomTrace,
}

/// Origin of an IBC voucher: transfer path plus base denomination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DenomTrace {
    #[serde(default)]
    pub path: String,
    pub base_denom: String,
}

#[derive(Debug, Deserialize)]
pub struct SupplyResponse {
    pub amount: RawCoin,
}

#[derive(Debug, Deserialize)]
pub struct StakingPoolResponse {
    pub pool: StakingPool,
}

/// Bonded and unbonded token totals, in the native denom's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StakingPool {
    pub bonded_tokens: String,
    pub not_bonded_tokens: String,
}

#[derive(Debug, Deserialize)]
pub struct InflationResponse {
    pub inflation: String,
}

#[derive(Debug, Deserialize)]
pub struct LockedCoinsResponse {
    #[serde(default)]
    pub coins: Vec<RawCoin>,
}

// -----------------------------------------------------------------------------
// Osmosis mint module
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OsmosisMintParamsResponse {
    pub params: OsmosisMintParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsmosisMintParams {
    pub epoch_identifier: String,
    pub distribution_proportions: DistributionProportions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistributionProportions {
    pub staking: String,
}

#[derive(Debug, Deserialize)]
pub struct EpochsResponse {
    #[serde(default)]
    pub epochs: Vec<EpochInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpochInfo {
    pub identifier: String,
    /// Protobuf duration rendered as seconds, e.g. `"86400s"`.
    pub duration: String,
}

#[derive(Debug, Deserialize)]
pub struct EpochProvisionsResponse {
    pub epoch_provisions: String,
}
