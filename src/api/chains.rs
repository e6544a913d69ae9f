// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain profile and token listing endpoints.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    aggregate::parse_chain_list,
    api::balance::ChainsQuery,
    cache::{keys, read_json, write_json},
    error::ApiError,
    models::{ChainProfile, FailureKind, TokenAsset},
    state::AppState,
};

/// Resolved profiles of the requested chains.
///
/// Unknown chains are left out. Profiles are cached per chain name.
#[utoipa::path(
    get,
    path = "/chains",
    tag = "Chains",
    params(ChainsQuery),
    responses(
        (status = 200, description = "Resolved chain profiles in requested order", body = [ChainProfile]),
        (status = 400, description = "No chains requested"),
        (status = 503, description = "Chain directory unavailable")
    )
)]
pub async fn list_chains(
    State(state): State<AppState>,
    Query(query): Query<ChainsQuery>,
) -> Result<Json<Vec<ChainProfile>>, ApiError> {
    let names = parse_chain_list(query.chains.as_deref().unwrap_or_default());
    if names.is_empty() {
        return Err(ApiError::bad_request("chains query parameter is required"));
    }

    let cached: Option<Vec<ChainProfile>> = names
        .iter()
        .map(|name| read_json::<ChainProfile>(state.cache.as_ref(), &keys::chain(name)))
        .collect();
    if let Some(profiles) = cached {
        return Ok(Json(profiles));
    }

    let mut profiles = Vec::with_capacity(names.len());
    let mut unavailable = None;
    for resolved in state.directory.resolve_all(&names).await {
        match resolved {
            Ok(resolved) => {
                write_json(
                    state.cache.as_ref(),
                    &keys::chain(&resolved.profile.name),
                    state.config.ttl.chains,
                    &resolved.profile,
                );
                profiles.push(resolved.profile);
            }
            Err(failure) if failure.kind == FailureKind::ChainUnsupported => {
                tracing::debug!(chain = %failure.chain, "Skipping unknown chain");
            }
            Err(failure) => {
                tracing::warn!(chain = %failure.chain, error = %failure.message, "Chain resolution failed");
                unavailable.get_or_insert(failure.message);
            }
        }
    }

    match unavailable {
        Some(message) if profiles.is_empty() => Err(ApiError::service_unavailable(message)),
        _ => Ok(Json(profiles)),
    }
}

/// Every asset of every directory chain.
#[utoipa::path(
    get,
    path = "/tokens",
    tag = "Chains",
    responses(
        (status = 200, description = "Flattened asset lists", body = [TokenAsset]),
        (status = 503, description = "Chain directory unavailable")
    )
)]
pub async fn list_tokens(State(state): State<AppState>) -> Result<Json<Vec<TokenAsset>>, ApiError> {
    if let Some(tokens) = read_json::<Vec<TokenAsset>>(state.cache.as_ref(), keys::TOKENS) {
        return Ok(Json(tokens));
    }

    let tokens = state.directory.all_tokens().await.map_err(|e| {
        tracing::warn!(error = %e, "Token listing failed");
        ApiError::service_unavailable(e.to_string())
    })?;

    if !tokens.is_empty() {
        write_json(state.cache.as_ref(), keys::TOKENS, state.config.ttl.tokens, &tokens);
    }

    Ok(Json(tokens))
}
