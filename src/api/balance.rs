// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-chain balance endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    aggregate::{parse_chain_list, AggregateError},
    cache::{keys, read_json, write_json},
    cosmos::address::decode_address,
    error::ApiError,
    models::{ChainBreakdown, ChainStatus, CrossChainTotal, PoolPosition},
    state::AppState,
};

/// Chain selection shared by the address endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ChainsQuery {
    /// Comma-separated directory chain names, e.g. `cosmoshub,osmosis`.
    pub chains: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// Address as requested.
    pub address: String,
    pub balances: CrossChainTotal,
    /// The `chains` query value, verbatim.
    pub chains: String,
    /// Per-chain results in requested order.
    pub breakdown: Vec<ChainBreakdown>,
    pub as_of: DateTime<Utc>,
}

/// Aggregate an address's holdings across the requested chains.
///
/// A chain that cannot be resolved or queried is reported in `breakdown` and
/// contributes zero. Responses that include a failed chain are not cached.
#[utoipa::path(
    get,
    path = "/balance/{address}",
    tag = "Balances",
    params(
        ("address" = String, Path, description = "Bech32 account address on any Cosmos chain"),
        ChainsQuery
    ),
    responses(
        (status = 200, description = "Aggregated balances", body = BalanceResponse),
        (status = 400, description = "Address is not valid bech32"),
        (status = 500, description = "Aggregation failed unexpectedly")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ChainsQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let raw_chains = query.chains.unwrap_or_default();
    let key = keys::balance(&address, &raw_chains);

    if let Some(cached) = read_json::<BalanceResponse>(state.cache.as_ref(), &key) {
        return Ok(Json(cached));
    }

    let chains = parse_chain_list(&raw_chains);
    let aggregator = state.aggregator.clone();
    let target = address.clone();
    let balances = tokio::spawn(async move { aggregator.balances(&target, &chains).await })
        .await
        .map_err(|e| {
            tracing::error!(address = %address, error = %e, "Balance aggregation aborted");
            ApiError::internal("").flagged()
        })?
        .map_err(|e| match e {
            AggregateError::InvalidAddress(e) => ApiError::bad_request(e.to_string()).flagged(),
            AggregateError::DirectoryUnavailable(reason) => {
                tracing::error!(reason = %reason, "Balance request without chain directory");
                ApiError::internal("").flagged()
            }
        })?;

    let response = BalanceResponse {
        address: balances.address,
        balances: balances.totals,
        chains: raw_chains,
        breakdown: balances.breakdown,
        as_of: Utc::now(),
    };

    if response
        .breakdown
        .iter()
        .all(|chain| chain.status != ChainStatus::Failed)
    {
        write_json(state.cache.as_ref(), &key, state.config.ttl.balance, &response);
    }

    Ok(Json(response))
}

/// Valued liquidity-pool positions of an address on the AMM chain.
///
/// Empty when `chains` is given without the AMM chain, or when market data
/// is unavailable.
#[utoipa::path(
    get,
    path = "/lp/{address}",
    tag = "Balances",
    params(
        ("address" = String, Path, description = "Bech32 account address on any Cosmos chain"),
        ChainsQuery
    ),
    responses(
        (status = 200, description = "Pool positions", body = [PoolPosition]),
        (status = 400, description = "Address is not valid bech32"),
        (status = 503, description = "Chain directory unavailable")
    )
)]
pub async fn get_pool_positions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ChainsQuery>,
) -> Result<Json<Vec<PoolPosition>>, ApiError> {
    decode_address(&address).map_err(|e| ApiError::bad_request(e.to_string()))?;

    // Cached positions are keyed by address alone.
    let chains = parse_chain_list(query.chains.as_deref().unwrap_or_default());
    if !state.aggregator.selects_amm_chain(&chains) {
        return Ok(Json(Vec::new()));
    }

    let key = keys::lp(&address);
    if let Some(cached) = read_json::<Vec<PoolPosition>>(state.cache.as_ref(), &key) {
        return Ok(Json(cached));
    }

    let positions = state
        .aggregator
        .pool_positions(&address, &chains)
        .await
        .map_err(|e| match e {
            AggregateError::InvalidAddress(e) => ApiError::bad_request(e.to_string()),
            AggregateError::DirectoryUnavailable(reason) => ApiError::service_unavailable(reason),
        })?;

    // An empty answer may be an outage; only real positions are cached.
    if !positions.is_empty() {
        write_json(state.cache.as_ref(), &key, state.config.ttl.lp, &positions);
    }

    Ok(Json(positions))
}
