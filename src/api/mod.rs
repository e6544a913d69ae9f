// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        ChainBalanceSnapshot, ChainBreakdown, ChainFailure, ChainProfile, ChainStatus,
        CrossChainTotal, FailureKind, PoolPosition, PriceQuote, PriceSource, QueryFailure,
        QueryKind, ResolvedCoin, RewardSummary, StakedSummary, TokenAsset, ValidatorAmount,
    },
    state::AppState,
};

pub mod apr;
pub mod balance;
pub mod chains;
pub mod health;
pub mod price;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/balance/{address}", get(balance::get_balance))
        .route("/lp/{address}", get(balance::get_pool_positions))
        .route("/apr/{chain}", get(apr::get_apr))
        .route("/price", get(price::no_price))
        .route("/price/", get(price::no_price))
        .route("/price/{id}", get(price::get_price))
        .route("/chains", get(chains::list_chains))
        .route("/tokens", get(chains::list_tokens))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        balance::get_balance,
        balance::get_pool_positions,
        apr::get_apr,
        price::get_price,
        price::no_price,
        chains::list_chains,
        chains::list_tokens,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            balance::BalanceResponse,
            apr::AprResponse,
            price::PriceResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            ChainProfile,
            CrossChainTotal,
            ChainBreakdown,
            ChainBalanceSnapshot,
            ChainFailure,
            ChainStatus,
            FailureKind,
            QueryFailure,
            QueryKind,
            ResolvedCoin,
            StakedSummary,
            RewardSummary,
            ValidatorAmount,
            PoolPosition,
            PriceSource,
            PriceQuote,
            TokenAsset
        )
    ),
    tags(
        (name = "Balances", description = "Cross-chain account balances and pool positions"),
        (name = "Chains", description = "Chain profiles, tokens and staking APR"),
        (name = "Prices", description = "Fiat price quotes"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
