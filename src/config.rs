// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, their defaults, and [`AppConfig`], which is
//! loaded once at startup. Unparsable values fall back to the default.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5001` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `DIRECTORY_URL` | Chain directory base URL | `https://chains.cosmos.directory` |
//! | `DIRECTORY_REST_URL` | REST proxy for chains without a listed endpoint | `https://rest.cosmos.directory` |
//! | `DIRECTORY_RPC_URL` | RPC proxy for chains without a listed endpoint | `https://rpc.cosmos.directory` |
//! | `COINGECKO_URL` | Price API base URL | `https://api.coingecko.com/api/v3` |
//! | `POOL_MARKET_URL` | AMM market data base URL | `https://api-osmosis.imperator.co` |
//! | `AMM_CHAIN` | Chain whose pool shares are valued | `osmosis` |
//! | `CHAIN_QUERY_TIMEOUT_SECS` | Bound on every upstream call | `10` |
//! | `DIRECTORY_REFRESH_SECS` | Chain directory refresh interval | `1800` |
//! | `CACHE_CAPACITY` | Response cache entries | `10000` |
//! | `CACHE_TTL_CHAINS_SECS` | Chain list and profile TTL | `86400` |
//! | `CACHE_TTL_APR_SECS` | `/apr` TTL | `86400` |
//! | `CACHE_TTL_PRICE_SECS` | `/price` TTL | `1800` |
//! | `CACHE_TTL_LP_SECS` | `/lp` TTL | `3600` |
//! | `CACHE_TTL_BALANCE_SECS` | `/balance` TTL | `3600` |
//! | `CACHE_TTL_TOKENS_SECS` | `/tokens` TTL | `86400` |
//! | `REWARD_DENOM_OFFSETS` | Extra reward decimals, `chain:offset,...` | empty |
//! | `APR_OVERRIDES` | Fixed `/apr` rates, `chain:rate,...` | empty |

use std::collections::HashMap;
use std::time::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DIRECTORY_URL_ENV: &str = "DIRECTORY_URL";
pub const DIRECTORY_REST_URL_ENV: &str = "DIRECTORY_REST_URL";
pub const DIRECTORY_RPC_URL_ENV: &str = "DIRECTORY_RPC_URL";
pub const COINGECKO_URL_ENV: &str = "COINGECKO_URL";
pub const POOL_MARKET_URL_ENV: &str = "POOL_MARKET_URL";
pub const AMM_CHAIN_ENV: &str = "AMM_CHAIN";
pub const CHAIN_QUERY_TIMEOUT_ENV: &str = "CHAIN_QUERY_TIMEOUT_SECS";
pub const DIRECTORY_REFRESH_ENV: &str = "DIRECTORY_REFRESH_SECS";
pub const CACHE_CAPACITY_ENV: &str = "CACHE_CAPACITY";
pub const REWARD_DENOM_OFFSETS_ENV: &str = "REWARD_DENOM_OFFSETS";
pub const APR_OVERRIDES_ENV: &str = "APR_OVERRIDES";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const DEFAULT_DIRECTORY_URL: &str = "https://chains.cosmos.directory";
pub const DEFAULT_DIRECTORY_REST_URL: &str = "https://rest.cosmos.directory";
pub const DEFAULT_DIRECTORY_RPC_URL: &str = "https://rpc.cosmos.directory";
pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_POOL_MARKET_URL: &str = "https://api-osmosis.imperator.co";
pub const DEFAULT_AMM_CHAIN: &str = "osmosis";
pub const DEFAULT_CHAIN_QUERY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DIRECTORY_REFRESH_SECS: u64 = 1800;
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Response cache lifetimes, one per route family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub chains: Duration,
    pub apr: Duration,
    pub price: Duration,
    pub lp: Duration,
    pub balance: Duration,
    pub tokens: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            chains: Duration::from_secs(86_400),
            apr: Duration::from_secs(86_400),
            price: Duration::from_secs(1_800),
            lp: Duration::from_secs(3_600),
            balance: Duration::from_secs(3_600),
            tokens: Duration::from_secs(86_400),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub json_logs: bool,
    pub directory_url: String,
    pub directory_rest_url: String,
    pub directory_rpc_url: String,
    pub coingecko_url: String,
    pub pool_market_url: String,
    pub amm_chain: String,
    pub query_timeout: Duration,
    pub directory_refresh: Duration,
    pub cache_capacity: usize,
    pub ttl: CacheTtls,
    pub reward_offsets: HashMap<String, u32>,
    /// Chains whose staking yield is published out of band rather than
    /// derived from mint and staking state.
    pub apr_overrides: HashMap<String, f64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secs = |name: &str, default: u64| {
            Duration::from_secs(parse_or(lookup(name), default))
        };

        let defaults = CacheTtls::default();

        Self {
            host: string(HOST_ENV, DEFAULT_HOST),
            port: parse_or(lookup(PORT_ENV), DEFAULT_PORT),
            json_logs: lookup(LOG_FORMAT_ENV)
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            directory_url: string(DIRECTORY_URL_ENV, DEFAULT_DIRECTORY_URL),
            directory_rest_url: string(DIRECTORY_REST_URL_ENV, DEFAULT_DIRECTORY_REST_URL),
            directory_rpc_url: string(DIRECTORY_RPC_URL_ENV, DEFAULT_DIRECTORY_RPC_URL),
            coingecko_url: string(COINGECKO_URL_ENV, DEFAULT_COINGECKO_URL),
            pool_market_url: string(POOL_MARKET_URL_ENV, DEFAULT_POOL_MARKET_URL),
            amm_chain: string(AMM_CHAIN_ENV, DEFAULT_AMM_CHAIN),
            query_timeout: secs(CHAIN_QUERY_TIMEOUT_ENV, DEFAULT_CHAIN_QUERY_TIMEOUT_SECS),
            directory_refresh: secs(DIRECTORY_REFRESH_ENV, DEFAULT_DIRECTORY_REFRESH_SECS),
            cache_capacity: parse_or(lookup(CACHE_CAPACITY_ENV), DEFAULT_CACHE_CAPACITY),
            ttl: CacheTtls {
                chains: secs("CACHE_TTL_CHAINS_SECS", defaults.chains.as_secs()),
                apr: secs("CACHE_TTL_APR_SECS", defaults.apr.as_secs()),
                price: secs("CACHE_TTL_PRICE_SECS", defaults.price.as_secs()),
                lp: secs("CACHE_TTL_LP_SECS", defaults.lp.as_secs()),
                balance: secs("CACHE_TTL_BALANCE_SECS", defaults.balance.as_secs()),
                tokens: secs("CACHE_TTL_TOKENS_SECS", defaults.tokens.as_secs()),
            },
            reward_offsets: lookup(REWARD_DENOM_OFFSETS_ENV)
                .map(|raw| parse_chain_map(&raw))
                .unwrap_or_default(),
            apr_overrides: lookup(APR_OVERRIDES_ENV)
                .map(|raw| parse_chain_map::<f64>(&raw))
                .unwrap_or_default()
                .into_iter()
                .filter(|(_, rate)| rate.is_finite() && *rate >= 0.0)
                .collect(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parse `chain:value,chain:value`. Malformed entries are skipped.
pub fn parse_chain_map<T: std::str::FromStr>(raw: &str) -> HashMap<String, T> {
    raw.split(',')
        .filter_map(|entry| {
            let (chain, offset) = entry.split_once(':')?;
            let chain = chain.trim();
            if chain.is_empty() {
                return None;
            }
            let offset = offset.trim().parse().ok()?;
            Some((chain.to_string(), offset))
        })
        .collect()
}
