// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Liquidity-pool share valuation on the AMM chain.
//!
//! Pool shares (`gamm/pool/<id>`) held liquid or locked are priced from the
//! market listing when one exists, otherwise from the pool's liquidity and
//! the holder's share of the supply. Nothing here fails the request: missing
//! market data yields no positions, a coin that cannot be priced is skipped.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::aggregate::fanout::{bounded, settle_all};
use crate::cosmos::denom::parse_amount;
use crate::cosmos::ChainQuery;
use crate::models::{
    is_pool_share, DerivedAddress, FailureKind, PoolPosition, PriceSource, RawCoin,
    POOL_SHARE_EXPONENT, POOL_SHARE_PREFIX,
};
use crate::providers::osmosis::{MarketPair, MarketToken, PoolMarketData};

/// Implied price of one share: `(held / supply) * liquidity / (held / 10^18)`.
pub fn implied_price(held: f64, supply: f64, liquidity: f64) -> Option<f64> {
    if held <= 0.0 || supply <= 0.0 {
        return None;
    }
    let value = (held / supply) * liquidity;
    let shares = held / 10f64.powi(POOL_SHARE_EXPONENT as i32);
    Some(value / shares)
}

/// Sum pool-share coins by denom, in first-seen order.
fn pool_shares(coins: impl IntoIterator<Item = RawCoin>) -> Vec<(String, f64)> {
    let mut order = Vec::new();
    let mut held: BTreeMap<String, f64> = BTreeMap::new();

    for coin in coins.into_iter().filter(|coin| is_pool_share(&coin.denom)) {
        let Ok(amount) = parse_amount(&coin.amount) else {
            tracing::warn!(denom = %coin.denom, amount = %coin.amount, "Skipping unparsable pool share");
            continue;
        };
        if !held.contains_key(&coin.denom) {
            order.push(coin.denom.clone());
        }
        *held.entry(coin.denom).or_insert(0.0) += amount;
    }

    order
        .into_iter()
        .map(|denom| {
            let amount = held.get(&denom).copied().unwrap_or(0.0);
            (denom, amount)
        })
        .collect()
}

/// Values pool-share holdings of one address on the AMM chain.
pub struct PoolValuator<'a> {
    client: &'a dyn ChainQuery,
    market: &'a dyn PoolMarketData,
    timeout: Duration,
}

impl<'a> PoolValuator<'a> {
    pub fn new(client: &'a dyn ChainQuery, market: &'a dyn PoolMarketData, timeout: Duration) -> Self {
        Self {
            client,
            market,
            timeout,
        }
    }

    pub async fn positions(&self, target: &DerivedAddress) -> Vec<PoolPosition> {
        let address = target.address.as_str();

        let (liquid, locked) = tokio::join!(
            bounded(self.timeout, "balances", self.client.all_balances(address)),
            bounded(self.timeout, "locked coins", self.client.locked_coins(address)),
        );

        let liquid = liquid.unwrap_or_else(|e| {
            tracing::warn!(chain = %target.chain_name, error = %e, "Pool valuation without liquid balances");
            Vec::new()
        });
        let locked = locked.unwrap_or_else(|e| {
            tracing::warn!(chain = %target.chain_name, error = %e, "Pool valuation without locked coins");
            Vec::new()
        });

        let shares = pool_shares(liquid.into_iter().chain(locked));
        if shares.is_empty() {
            return Vec::new();
        }

        let (tokens, pairs) = match tokio::try_join!(self.market.tokens(), self.market.pairs()) {
            Ok(market) => market,
            Err(e) => {
                tracing::warn!(
                    kind = ?FailureKind::PricingUnavailable,
                    error = %e,
                    "Pool market data unavailable"
                );
                return Vec::new();
            }
        };

        let settled = settle_all(
            shares
                .iter()
                .map(|(denom, held)| self.value_share(denom, *held, &tokens, &pairs)),
        )
        .await;

        for skipped in &settled.failed {
            tracing::warn!(reason = %skipped, "Skipping pool share");
        }
        settled.succeeded
    }

    async fn value_share(
        &self,
        denom: &str,
        held: f64,
        tokens: &[MarketToken],
        pairs: &[MarketPair],
    ) -> Result<PoolPosition, String> {
        if let Some(listed) = tokens.iter().find(|token| token.denom == denom) {
            if let Some(price) = listed.price {
                return Ok(PoolPosition {
                    pair_symbol: listed.symbol.clone(),
                    denom: denom.to_string(),
                    amount: held / 10f64.powi(listed.exponent as i32),
                    implied_price: price,
                    price_source: PriceSource::Listed,
                });
            }
        }

        let pool_id = denom.strip_prefix(POOL_SHARE_PREFIX).unwrap_or(denom);
        let pair = pairs
            .iter()
            .find(|pair| pair.pool_id == pool_id)
            .ok_or_else(|| format!("{denom}: pool {pool_id} has no pair summary"))?;

        let supply = bounded(self.timeout, "supply", self.client.supply_of(denom))
            .await
            .map_err(|e| format!("{denom}: {e}"))?;
        let supply = parse_amount(&supply.amount).map_err(|e| format!("{denom}: {e}"))?;

        let price = implied_price(held, supply, pair.liquidity)
            .ok_or_else(|| format!("{denom}: empty pool supply"))?;

        Ok(PoolPosition {
            pair_symbol: pair.symbol(),
            denom: denom.to_string(),
            amount: held / 10f64.powi(POOL_SHARE_EXPONENT as i32),
            implied_price: price,
            price_source: PriceSource::Implied,
        })
    }
}
