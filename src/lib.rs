// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Cosmos Balances - Multi-chain Balance Aggregation Service
//!
//! Takes one bech32 address, derives its equivalent on every requested Cosmos
//! chain, queries each chain concurrently and folds liquid, staked, reward and
//! liquidity-pool holdings into cross-chain totals behind a cached HTTP API.
//!
//! ## Modules
//!
//! - `aggregate` - Per-chain snapshots, pool valuation and totalization
//! - `api` - HTTP API handlers (Axum)
//! - `cache` - In-process response cache
//! - `cosmos` - Bech32 addresses, chain REST client, denoms and APR
//! - `providers` - Chain directory, price and pool market data clients

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod cosmos;
pub mod directory_refresher;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;

#[cfg(test)]
mod test_support;
