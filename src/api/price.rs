// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fiat price endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    cache::{keys, read_json, write_json},
    error::ApiError,
    models::PriceQuote,
    providers::ProviderError,
    state::AppState,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PriceResponse {
    Quote(PriceQuote),
    /// `{"no": "price"}` when there is nothing to quote.
    Missing { no: String },
}

impl PriceResponse {
    fn missing() -> Self {
        PriceResponse::Missing {
            no: "price".to_string(),
        }
    }
}

/// USD, CAD and EUR quotes for a CoinGecko id.
#[utoipa::path(
    get,
    path = "/price/{id}",
    tag = "Prices",
    params(("id" = String, Path, description = "CoinGecko asset id, e.g. `cosmos`")),
    responses(
        (status = 200, description = "Price quote, or `{\"no\": \"price\"}`", body = PriceResponse),
        (status = 503, description = "Price provider unavailable")
    )
)]
pub async fn get_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PriceResponse>, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Ok(Json(PriceResponse::missing()));
    }

    let key = keys::price(id);
    if let Some(quote) = read_json::<PriceQuote>(state.cache.as_ref(), &key) {
        return Ok(Json(PriceResponse::Quote(quote)));
    }

    match state.prices.price(id).await {
        Ok(quote) => {
            write_json(state.cache.as_ref(), &key, state.config.ttl.price, &quote);
            Ok(Json(PriceResponse::Quote(quote)))
        }
        Err(ProviderError::NotFound(_)) => Ok(Json(PriceResponse::missing())),
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "Price lookup failed");
            Err(ApiError::service_unavailable(e.to_string()))
        }
    }
}

/// `/price/` without an id.
#[utoipa::path(
    get,
    path = "/price/",
    tag = "Prices",
    responses((status = 200, description = "Always `{\"no\": \"price\"}`", body = PriceResponse))
)]
pub async fn no_price() -> Json<PriceResponse> {
    Json(PriceResponse::missing())
}
