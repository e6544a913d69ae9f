// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Denomination resolution and decimal scaling.
//!
//! ## Scaling policy
//!
//! - A coin whose base denom is the chain's native denom uses the chain's
//!   exponent.
//! - Any other coin (bridged or chain-local) uses the exponent recorded for
//!   its base denom in [`DenomExponents`], which is built from every enabled
//!   chain's native denom and the directory asset lists. This is the origin
//!   chain's precision whenever the origin is known.
//! - Pool shares (`gamm/pool/<id>`) always carry 18 decimals.
//! - Unknown base denoms fall back to the destination chain's exponent.

use std::collections::HashMap;
use std::time::Duration;

use crate::aggregate::fanout::{bounded, settle_all};
use crate::cosmos::ChainQuery;
use crate::models::{
    is_pool_share, ChainProfile, FailureKind, QueryFailure, QueryKind, RawCoin, ResolvedCoin,
    TokenAsset, IBC_DENOM_PREFIX, POOL_SHARE_EXPONENT,
};

/// Base denom → decimal exponent lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenomExponents {
    by_denom: HashMap<String, u32>,
}

impl DenomExponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with each profile's native denom.
    pub fn from_profiles<'a>(profiles: impl IntoIterator<Item = &'a ChainProfile>) -> Self {
        let mut table = Self::new();
        for profile in profiles {
            table
                .by_denom
                .insert(profile.native_denom.clone(), profile.decimal_exponent);
        }
        table
    }

    /// Add asset-list decimals without overriding entries already present.
    pub fn with_assets<'a>(mut self, assets: impl IntoIterator<Item = &'a TokenAsset>) -> Self {
        for asset in assets {
            self.by_denom
                .entry(asset.base.clone())
                .or_insert(asset.decimals);
        }
        self
    }

    pub fn insert(&mut self, denom: impl Into<String>, exponent: u32) {
        self.by_denom.insert(denom.into(), exponent);
    }

    pub fn get(&self, denom: &str) -> Option<u32> {
        self.by_denom.get(denom).copied()
    }

    /// Exponent used to scale `base_denom` held on `chain`.
    pub fn exponent_for(&self, base_denom: &str, chain: &ChainProfile) -> u32 {
        if base_denom == chain.native_denom {
            return chain.decimal_exponent;
        }
        if is_pool_share(base_denom) {
            return POOL_SHARE_EXPONENT;
        }
        self.get(base_denom).unwrap_or(chain.decimal_exponent)
    }

    pub fn len(&self) -> usize {
        self.by_denom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_denom.is_empty()
    }
}

/// Parse a chain amount string (integer or fixed-point decimal).
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("amount is not a number: {raw:?}"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("amount out of range: {raw:?}"));
    }
    Ok(value)
}

/// Parse and divide by `10^exponent`.
pub fn scale_amount(raw: &str, exponent: u32) -> Result<f64, String> {
    Ok(parse_amount(raw)? / 10f64.powi(exponent as i32))
}

/// Coins resolved for one address, plus the coins that could not be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBatch {
    pub coins: Vec<ResolvedCoin>,
    pub failures: Vec<QueryFailure>,
}

/// Resolve IBC denoms and scale amounts for every coin concurrently.
///
/// A coin whose trace lookup or amount parsing fails is left out of `coins`
/// and reported in `failures`; the rest of the batch is unaffected.
pub async fn resolve_coins(
    coins: Vec<RawCoin>,
    client: &dyn ChainQuery,
    chain: &ChainProfile,
    exponents: &DenomExponents,
    timeout: Duration,
) -> ResolvedBatch {
    let settled = settle_all(
        coins
            .into_iter()
            .map(|coin| resolve_coin(coin, client, chain, exponents, timeout)),
    )
    .await;

    for failure in &settled.failed {
        tracing::warn!(
            chain = %chain.name,
            denom = ?failure.subject,
            error = %failure.message,
            "Dropping coin that could not be resolved"
        );
    }

    ResolvedBatch {
        coins: settled.succeeded,
        failures: settled.failed,
    }
}

async fn resolve_coin(
    coin: RawCoin,
    client: &dyn ChainQuery,
    chain: &ChainProfile,
    exponents: &DenomExponents,
    timeout: Duration,
) -> Result<ResolvedCoin, QueryFailure> {
    let (base_denom, ibc_denom) = match coin.ibc_hash() {
        Some(hash) => {
            let trace = bounded(timeout, "denom trace", client.denom_trace(hash))
                .await
                .map_err(|e| QueryFailure {
                    query: QueryKind::DenomTrace,
                    kind: e.kind(),
                    subject: Some(coin.denom.clone()),
                    message: e.to_string(),
                })?;

            if trace.base_denom.is_empty() || trace.base_denom.starts_with(IBC_DENOM_PREFIX) {
                return Err(QueryFailure {
                    query: QueryKind::DenomTrace,
                    kind: FailureKind::MalformedResponse,
                    subject: Some(coin.denom.clone()),
                    message: format!("trace returned unusable base denom {:?}", trace.base_denom),
                });
            }
            (trace.base_denom, Some(coin.denom.clone()))
        }
        None => (coin.denom.clone(), None),
    };

    let exponent = exponents.exponent_for(&base_denom, chain);
    let amount = scale_amount(&coin.amount, exponent).map_err(|message| QueryFailure {
        query: QueryKind::Liquid,
        kind: FailureKind::MalformedResponse,
        subject: Some(coin.denom.clone()),
        message,
    })?;

    Ok(ResolvedCoin {
        base_denom,
        amount,
        ibc_denom,
    })
}
