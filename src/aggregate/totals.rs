// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-chain totalization.
//!
//! Folds every chain's snapshot into buckets keyed by base denom:
//!
//! | Bucket        | Source                                              |
//! |---------------|-----------------------------------------------------|
//! | `native`      | liquid native denom, keyed by chain name            |
//! | `foreign`     | liquid, neither native nor a pool share             |
//! | `pool_locked` | liquid `gamm/pool/<id>` shares                      |
//! | `staked`      | delegation totals                                   |
//! | `rewards`     | pending reward totals                               |
//! | `total`       | sum of all of the above per denom                   |
//!
//! Valued pool positions are carried through in `pools` without touching any
//! bucket.

use std::collections::BTreeMap;

use crate::models::{
    ChainBalanceSnapshot, ChainBreakdown, ChainFailure, ChainStatus, CrossChainTotal,
    PoolPosition,
};

/// What one requested chain produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub chain: String,
    pub native_denom: Option<String>,
    pub address: Option<String>,
    pub result: Result<ChainBalanceSnapshot, ChainFailure>,
}

impl ChainOutcome {
    pub fn reported(
        chain: impl Into<String>,
        native_denom: impl Into<String>,
        snapshot: ChainBalanceSnapshot,
    ) -> Self {
        Self {
            chain: chain.into(),
            native_denom: Some(native_denom.into()),
            address: Some(snapshot.address.clone()),
            result: Ok(snapshot),
        }
    }

    pub fn failed(failure: ChainFailure) -> Self {
        Self {
            chain: failure.chain.clone(),
            native_denom: None,
            address: None,
            result: Err(failure),
        }
    }

    /// A chain whose address was derived but whose every query failed.
    pub fn unreachable(
        native_denom: impl Into<String>,
        address: impl Into<String>,
        failure: ChainFailure,
    ) -> Self {
        Self {
            native_denom: Some(native_denom.into()),
            address: Some(address.into()),
            ..Self::failed(failure)
        }
    }

    pub fn status(&self) -> ChainStatus {
        match &self.result {
            Ok(snapshot) if snapshot.is_complete() => ChainStatus::Ok,
            Ok(_) => ChainStatus::Partial,
            Err(_) => ChainStatus::Failed,
        }
    }

    fn breakdown(&self) -> ChainBreakdown {
        let (snapshot, failure) = match &self.result {
            Ok(snapshot) => (Some(snapshot.clone()), None),
            Err(failure) => (None, Some(failure.clone())),
        };
        ChainBreakdown {
            chain: self.chain.clone(),
            status: self.status(),
            address: self.address.clone(),
            native_denom: self.native_denom.clone(),
            snapshot,
            failure,
        }
    }
}

fn add(bucket: &mut BTreeMap<String, f64>, denom: &str, amount: f64) {
    *bucket.entry(denom.to_string()).or_insert(0.0) += amount;
}

/// Merge outcomes into totals plus the per-chain breakdown in input order.
pub fn totalize(
    outcomes: &[ChainOutcome],
    pools: Vec<PoolPosition>,
) -> (CrossChainTotal, Vec<ChainBreakdown>) {
    let mut totals = CrossChainTotal::default();
    let mut native_by_denom: BTreeMap<String, f64> = BTreeMap::new();

    for outcome in outcomes {
        let native = totals.native.entry(outcome.chain.clone()).or_insert(0.0);

        let (Ok(snapshot), Some(native_denom)) = (&outcome.result, &outcome.native_denom) else {
            continue;
        };

        for coin in &snapshot.liquid {
            if coin.base_denom == *native_denom {
                *native += coin.amount;
                add(&mut native_by_denom, &coin.base_denom, coin.amount);
            } else if crate::models::is_pool_share(&coin.base_denom) {
                add(&mut totals.pool_locked, &coin.base_denom, coin.amount);
            } else {
                add(&mut totals.foreign, &coin.base_denom, coin.amount);
            }
        }

        if snapshot.staked.total > 0.0 {
            add(&mut totals.staked, &snapshot.staked.denom, snapshot.staked.total);
        }
        if snapshot.rewards.total > 0.0 {
            add(&mut totals.rewards, &snapshot.rewards.denom, snapshot.rewards.total);
        }
    }

    for bucket in [
        &native_by_denom,
        &totals.foreign,
        &totals.staked,
        &totals.rewards,
        &totals.pool_locked,
    ] {
        for (denom, amount) in bucket {
            add(&mut totals.total, denom, *amount);
        }
    }

    totals.pools = pools;

    let breakdown = outcomes.iter().map(ChainOutcome::breakdown).collect();
    (totals, breakdown)
}
