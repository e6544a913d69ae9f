// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staking APR endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    cache::{keys, read_json, write_json},
    cosmos::apr::AprError,
    error::ApiError,
    models::FailureKind,
    state::AppState,
};

pub const UNSUPPORTED_CHAIN: &str = "Chain is not supported";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AprResponse {
    /// Annual staking yield as a fraction (`0.12` is 12%).
    Apr { apr: f64 },
    Unsupported { error: String },
}

impl AprResponse {
    fn unsupported() -> Self {
        AprResponse::Unsupported {
            error: UNSUPPORTED_CHAIN.to_string(),
        }
    }
}

/// Current staking APR of a chain.
#[utoipa::path(
    get,
    path = "/apr/{chain}",
    tag = "Chains",
    params(("chain" = String, Path, description = "Directory chain name")),
    responses(
        (status = 200, description = "APR, or an error body for unknown chains", body = AprResponse),
        (status = 503, description = "Chain or directory unavailable")
    )
)]
pub async fn get_apr(
    State(state): State<AppState>,
    Path(chain): Path<String>,
) -> Result<Json<AprResponse>, ApiError> {
    if let Some(&apr) = state.config.apr_overrides.get(&chain) {
        return Ok(Json(AprResponse::Apr { apr }));
    }

    let key = keys::apr(&chain);
    if let Some(apr) = read_json::<f64>(state.cache.as_ref(), &key) {
        return Ok(Json(AprResponse::Apr { apr }));
    }

    let resolved = match state.directory.resolve(&chain).await {
        Ok(resolved) => resolved,
        Err(failure) if failure.kind == FailureKind::ChainUnsupported => {
            return Ok(Json(AprResponse::unsupported()));
        }
        Err(failure) => return Err(ApiError::service_unavailable(failure.message)),
    };
    let profile = &resolved.profile;

    let client = match state.clients.connect(profile) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(chain = %chain, error = %e, "Cannot build chain client");
            return Ok(Json(AprResponse::unsupported()));
        }
    };

    match state.apr.chain_apr(client.as_ref(), profile).await {
        Ok(apr) => {
            write_json(state.cache.as_ref(), &key, state.config.ttl.apr, &apr);
            Ok(Json(AprResponse::Apr { apr }))
        }
        Err(AprError::Chain(e)) if e.kind() == FailureKind::ChainUnsupported => {
            tracing::info!(chain = %chain, error = %e, "Chain exposes no staking data");
            Ok(Json(AprResponse::unsupported()))
        }
        Err(e) => {
            tracing::warn!(chain = %chain, error = %e, "APR calculation failed");
            Err(ApiError::service_unavailable(e.to_string()))
        }
    }
}
