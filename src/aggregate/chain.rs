// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-chain aggregation.
//!
//! Liquid balances, delegations and rewards are fetched concurrently for one
//! derived address. Each query fails on its own; the snapshot keeps whatever
//! succeeded and records the rest in `failures`.

use std::time::Duration;

use crate::aggregate::fanout::bounded;
use crate::cosmos::denom::{parse_amount, resolve_coins, DenomExponents};
use crate::cosmos::{ChainQuery, DelegationEntry, ValidatorReward};
use crate::models::{
    ChainBalanceSnapshot, ChainProfile, DerivedAddress, FailureKind, QueryFailure, QueryKind,
    ResolvedCoin, RewardSummary, StakedSummary, ValidatorAmount,
};

/// Build the balance snapshot of one derived address.
pub async fn aggregate_chain(
    derived: &DerivedAddress,
    client: &dyn ChainQuery,
    exponents: &DenomExponents,
    timeout: Duration,
) -> ChainBalanceSnapshot {
    let profile = &derived.profile;
    let address = derived.address.as_str();

    let (liquid, staked, rewards) = tokio::join!(
        fetch_liquid(address, client, profile, exponents, timeout),
        fetch_staked(address, client, profile, timeout),
        fetch_rewards(address, client, profile, timeout),
    );

    let mut failures = Vec::new();

    let liquid = match liquid {
        Ok((coins, coin_failures)) => {
            failures.extend(coin_failures);
            coins
        }
        Err(failure) => {
            failures.push(failure);
            Vec::new()
        }
    };

    let staked = staked.unwrap_or_else(|failure| {
        failures.push(failure);
        StakedSummary {
            denom: profile.native_denom.clone(),
            ..StakedSummary::default()
        }
    });

    let rewards = rewards.unwrap_or_else(|failure| {
        failures.push(failure);
        RewardSummary {
            denom: profile.native_denom.clone(),
            ..RewardSummary::default()
        }
    });

    if !failures.is_empty() {
        tracing::warn!(
            chain = %profile.name,
            address = %address,
            failed = failures.len(),
            "Chain snapshot is partial"
        );
    }

    ChainBalanceSnapshot {
        address: address.to_string(),
        liquid,
        staked,
        rewards,
        failures,
    }
}

/// True when none of the three top-level queries produced data.
pub fn is_total_failure(snapshot: &ChainBalanceSnapshot) -> bool {
    [QueryKind::Liquid, QueryKind::Staked, QueryKind::Rewards]
        .iter()
        .all(|kind| {
            snapshot
                .failures
                .iter()
                .any(|f| f.query == *kind && f.subject.is_none())
        })
}

async fn fetch_liquid(
    address: &str,
    client: &dyn ChainQuery,
    profile: &ChainProfile,
    exponents: &DenomExponents,
    timeout: Duration,
) -> Result<(Vec<ResolvedCoin>, Vec<QueryFailure>), QueryFailure> {
    let coins = bounded(timeout, "balances", client.all_balances(address))
        .await
        .map_err(|e| query_failure(QueryKind::Liquid, e.kind(), e.to_string()))?;

    let batch = resolve_coins(coins, client, profile, exponents, timeout).await;
    Ok((batch.coins, batch.failures))
}

async fn fetch_staked(
    address: &str,
    client: &dyn ChainQuery,
    profile: &ChainProfile,
    timeout: Duration,
) -> Result<StakedSummary, QueryFailure> {
    let delegations = bounded(timeout, "delegations", client.delegations(address))
        .await
        .map_err(|e| query_failure(QueryKind::Staked, e.kind(), e.to_string()))?;

    reduce_delegations(&delegations, profile)
        .map_err(|message| query_failure(QueryKind::Staked, FailureKind::MalformedResponse, message))
}

async fn fetch_rewards(
    address: &str,
    client: &dyn ChainQuery,
    profile: &ChainProfile,
    timeout: Duration,
) -> Result<RewardSummary, QueryFailure> {
    let rewards = bounded(timeout, "rewards", client.rewards(address))
        .await
        .map_err(|e| query_failure(QueryKind::Rewards, e.kind(), e.to_string()))?;

    reduce_rewards(&rewards, profile)
        .map_err(|message| query_failure(QueryKind::Rewards, FailureKind::MalformedResponse, message))
}

fn query_failure(query: QueryKind, kind: FailureKind, message: String) -> QueryFailure {
    QueryFailure {
        query,
        kind,
        subject: None,
        message,
    }
}

/// Sum delegations in display units. No delegations is a zero total.
pub fn reduce_delegations(
    delegations: &[DelegationEntry],
    profile: &ChainProfile,
) -> Result<StakedSummary, String> {
    let scale = profile.native_scale();

    let delegations = delegations
        .iter()
        .map(|d| {
            Ok(ValidatorAmount {
                validator: d.validator.clone(),
                amount: parse_amount(&d.balance.amount)? / scale,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let total = delegations.iter().map(|d| d.amount).sum();

    Ok(StakedSummary {
        denom: profile.native_denom.clone(),
        delegations,
        total,
    })
}

/// Sum the first reward coin of every validator, scaled by the chain's
/// exponent plus its reward offset.
pub fn reduce_rewards(
    rewards: &[ValidatorReward],
    profile: &ChainProfile,
) -> Result<RewardSummary, String> {
    let scale = profile.reward_scale();

    let breakdown = rewards
        .iter()
        .map(|r| {
            let amount = match r.reward.first() {
                Some(coin) => parse_amount(&coin.amount)? / scale,
                None => 0.0,
            };
            Ok(ValidatorAmount {
                validator: r.validator.clone(),
                amount,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let total = breakdown.iter().map(|r| r.amount).sum();

    Ok(RewardSummary {
        denom: profile.native_denom.clone(),
        breakdown,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmos::ChainClientError;
    use crate::models::RawCoin;
    use crate::test_support::{derived, profile, MockChain};

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn exponents() -> DenomExponents {
        DenomExponents::from_profiles(&[
            profile("cosmoshub", "cosmos", "uatom", 6),
            profile("osmosis", "osmo", "uosmo", 6),
        ])
    }

    #[test]
    fn zero_delegations_is_zero_total() {
        let summary = reduce_delegations(&[], &profile("cosmoshub", "cosmos", "uatom", 6)).unwrap();
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.denom, "uatom");
        assert!(summary.delegations.is_empty());
    }

    #[test]
    fn rewards_use_first_coin_and_offset() {
        let mut chain = profile("evmos", "evmos", "aevmos", 6);
        chain.reward_denom_offset = 2;

        let rewards = vec![
            ValidatorReward {
                validator: "v1".into(),
                reward: vec![RawCoin::new("aevmos", "300000000"), RawCoin::new("other", "9")],
            },
            ValidatorReward {
                validator: "v2".into(),
                reward: vec![],
            },
            ValidatorReward {
                validator: "v3".into(),
                reward: vec![RawCoin::new("aevmos", "100000000.500")],
            },
        ];

        let summary = reduce_rewards(&rewards, &chain).unwrap();
        assert_eq!(summary.breakdown[0].amount, 3.0);
        assert_eq!(summary.breakdown[1].amount, 0.0);
        assert!((summary.total - 4.000000005).abs() < 1e-12);
    }

    #[test]
    fn malformed_delegation_amount_is_reported() {
        let entries = vec![DelegationEntry {
            validator: "v".into(),
            balance: RawCoin::new("uatom", "lots"),
        }];
        assert!(reduce_delegations(&entries, &profile("cosmoshub", "cosmos", "uatom", 6)).is_err());
    }

    #[tokio::test]
    async fn builds_full_snapshot() {
        let target = derived("osmosis", "osmo", "uosmo", 6);
        let client = MockChain::default()
            .with_balances(vec![
                RawCoin::new("uosmo", "5000000"),
                RawCoin::new("ibc/ATOMHASH", "2000000"),
            ])
            .with_trace("ATOMHASH", "uatom")
            .with_delegations(vec![("osmovaloper1a", "1000000")])
            .with_rewards(vec![("osmovaloper1a", vec![("uosmo", "250000.000000000000000000")])]);

        let snapshot = aggregate_chain(&target, &client, &exponents(), TIMEOUT).await;

        assert!(snapshot.is_complete());
        assert_eq!(snapshot.address, target.address);
        assert_eq!(snapshot.liquid.len(), 2);
        assert_eq!(snapshot.liquid[1].base_denom, "uatom");
        assert_eq!(snapshot.staked.total, 1.0);
        assert_eq!(snapshot.staked.denom, "uosmo");
        assert_eq!(snapshot.rewards.total, 0.25);
    }

    #[tokio::test]
    async fn one_failed_query_does_not_block_the_others() {
        let target = derived("cosmoshub", "cosmos", "uatom", 6);
        let client = MockChain::default()
            .with_balances(vec![RawCoin::new("uatom", "1000000")])
            .with_delegations_error(ChainClientError::NetworkUnavailable("down".into()))
            .with_rewards(vec![]);

        let snapshot = aggregate_chain(&target, &client, &exponents(), TIMEOUT).await;

        assert_eq!(snapshot.liquid[0].amount, 1.0);
        assert_eq!(snapshot.staked.total, 0.0);
        assert_eq!(snapshot.failures.len(), 1);
        assert_eq!(snapshot.failures[0].query, QueryKind::Staked);
        assert_eq!(snapshot.failures[0].kind, FailureKind::NetworkUnavailable);
        assert!(!is_total_failure(&snapshot));
    }

    #[tokio::test]
    async fn hanging_query_is_bounded() {
        let target = derived("cosmoshub", "cosmos", "uatom", 6);
        let client = MockChain::default()
            .with_balances(vec![RawCoin::new("uatom", "1000000")])
            .hanging_rewards();

        let snapshot =
            aggregate_chain(&target, &client, &exponents(), Duration::from_millis(20)).await;

        assert_eq!(snapshot.liquid.len(), 1);
        assert_eq!(snapshot.failures.len(), 1);
        assert_eq!(snapshot.failures[0].query, QueryKind::Rewards);
        assert_eq!(snapshot.failures[0].kind, FailureKind::Timeout);
    }

    #[tokio::test]
    async fn all_queries_failing_is_total_failure() {
        let target = derived("juno", "juno", "ujuno", 6);
        let err = ChainClientError::Timeout("rpc".into());
        let client = MockChain::default()
            .with_balances_error(err.clone())
            .with_delegations_error(err.clone())
            .with_rewards_error(err);

        let snapshot = aggregate_chain(&target, &client, &exponents(), TIMEOUT).await;
        assert!(is_total_failure(&snapshot));
    }
}
