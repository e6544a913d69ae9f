// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Data Models
//!
//! Value types shared by the aggregation engine and the REST API. Everything
//! here is request-scoped except [`ChainProfile`], which is resolved from the
//! chain directory and cached process-wide.
//!
//! ## Model Categories
//!
//! - **Chains**: [`ChainProfile`], [`DerivedAddress`]
//! - **Coins**: [`RawCoin`] as returned by a chain, [`ResolvedCoin`] after
//!   denomination resolution and decimal scaling
//! - **Per-chain results**: [`ChainBalanceSnapshot`], [`ChainBreakdown`]
//! - **Totals**: [`CrossChainTotal`], [`PoolPosition`]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix of IBC hash-denominations (`ibc/<hash>`).
pub const IBC_DENOM_PREFIX: &str = "ibc/";

/// Prefix of AMM pool-share denominations (`gamm/pool/<id>`).
pub const POOL_SHARE_PREFIX: &str = "gamm/pool/";

/// Decimals of every pool-share token.
pub const POOL_SHARE_EXPONENT: u32 = 18;

// =============================================================================
// Chains
// =============================================================================

/// Resolved metadata for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChainProfile {
    /// Directory name (e.g. `cosmoshub`).
    pub name: String,
    /// Network chain id (e.g. `cosmoshub-4`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    /// Bech32 human-readable part used for account addresses.
    pub address_prefix: String,
    /// Staking / fee denomination in its smallest unit (e.g. `uatom`).
    pub native_denom: String,
    /// Number of decimals between the native denom and its display unit.
    pub decimal_exponent: u32,
    pub rpc_endpoint: String,
    pub rest_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coingecko_id: Option<String>,
    /// Extra decimals carried by reward amounts on this chain.
    #[serde(default)]
    pub reward_denom_offset: u32,
}

impl ChainProfile {
    /// Divisor turning a native raw amount into display units.
    pub fn native_scale(&self) -> f64 {
        10f64.powi(self.decimal_exponent as i32)
    }

    /// Divisor turning a raw reward amount into display units.
    pub fn reward_scale(&self) -> f64 {
        10f64.powi((self.decimal_exponent + self.reward_denom_offset) as i32)
    }
}

/// A source address re-encoded for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DerivedAddress {
    pub chain_name: String,
    pub address: String,
    #[serde(skip)]
    pub profile: ChainProfile,
}

// =============================================================================
// Coins
// =============================================================================

/// A coin exactly as a chain reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawCoin {
    pub denom: String,
    /// Integer (or fixed-point decimal for reward coins) kept as a string.
    pub amount: String,
}

impl RawCoin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// The hash part of an `ibc/<hash>` denomination.
    pub fn ibc_hash(&self) -> Option<&str> {
        self.denom
            .strip_prefix(IBC_DENOM_PREFIX)
            .filter(|hash| !hash.is_empty())
    }

    pub fn is_pool_share(&self) -> bool {
        is_pool_share(&self.denom)
    }
}

pub fn is_pool_share(denom: &str) -> bool {
    denom.starts_with(POOL_SHARE_PREFIX)
}

/// A coin after IBC resolution and decimal scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedCoin {
    /// Canonical base denomination, never an `ibc/` hash.
    pub base_denom: String,
    /// Display-unit amount.
    pub amount: f64,
    /// Original hash-denom when the coin was bridged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ibc_denom: Option<String>,
}

// =============================================================================
// Per-chain results
// =============================================================================

/// Amount attributed to a single validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidatorAmount {
    pub validator: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StakedSummary {
    pub denom: String,
    pub delegations: Vec<ValidatorAmount>,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RewardSummary {
    pub denom: String,
    pub breakdown: Vec<ValidatorAmount>,
    pub total: f64,
}

/// Failure taxonomy shared by every layer of the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidAddressFormat,
    ChainUnsupported,
    NetworkUnavailable,
    Timeout,
    MalformedResponse,
    PricingUnavailable,
}

/// Which read a [`QueryFailure`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Liquid,
    Staked,
    Rewards,
    DenomTrace,
}

/// A single failed read inside an otherwise usable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueryFailure {
    pub query: QueryKind,
    pub kind: FailureKind,
    /// The denom concerned, for per-coin failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// Balances of one derived address on one chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChainBalanceSnapshot {
    pub address: String,
    pub liquid: Vec<ResolvedCoin>,
    pub staked: StakedSummary,
    pub rewards: RewardSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<QueryFailure>,
}

impl ChainBalanceSnapshot {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A chain that produced no snapshot at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChainFailure {
    pub chain: String,
    pub kind: FailureKind,
    pub message: String,
}

impl ChainFailure {
    pub fn new(chain: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(chain: impl Into<String>) -> Self {
        let chain = chain.into();
        let message = format!("chain `{chain}` is not in the directory");
        Self::new(chain, FailureKind::ChainUnsupported, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    Ok,
    Partial,
    Failed,
}

/// One entry of the per-chain breakdown, in requested chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChainBreakdown {
    pub chain: String,
    pub status: ChainStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_denom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ChainBalanceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ChainFailure>,
}

// =============================================================================
// Totals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// The share token has its own market listing.
    Listed,
    /// Derived from pool liquidity and share of supply.
    Implied,
}

/// A valued AMM pool-share holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PoolPosition {
    /// `BASE/QUOTE` for implied prices, the listed symbol otherwise.
    pub pair_symbol: String,
    pub denom: String,
    /// Held shares in display units.
    pub amount: f64,
    pub implied_price: f64,
    pub price_source: PriceSource,
}

/// Cross-chain totals partitioned by origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CrossChainTotal {
    /// Every bucket below summed by denom (pool positions excluded).
    pub total: BTreeMap<String, f64>,
    /// Native liquid balance keyed by chain name.
    pub native: BTreeMap<String, f64>,
    /// Non-native, non-pool-share liquid balances keyed by base denom.
    pub foreign: BTreeMap<String, f64>,
    pub staked: BTreeMap<String, f64>,
    pub rewards: BTreeMap<String, f64>,
    pub pool_locked: BTreeMap<String, f64>,
    /// Valued pool positions, reported per pair.
    pub pools: Vec<PoolPosition>,
}

// =============================================================================
// Directory & market collaborators
// =============================================================================

/// One asset from a chain's asset list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenAsset {
    pub chain: String,
    pub base: String,
    pub symbol: String,
    pub decimals: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coingecko_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

/// Fiat quotes for one market id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eur: Option<f64>,
}
