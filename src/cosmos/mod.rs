// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cosmos chain access.
//!
//! - `address` - bech32 decoding and per-chain address derivation
//! - `client` - REST query client and its trait seam
//! - `denom` - IBC denom resolution and decimal scaling
//! - `apr` - staking APR from mint and staking module state
//! - `types` - REST gateway wire types

pub mod address;
pub mod apr;
pub mod client;
pub mod denom;
pub mod types;

pub use client::{
    ChainClientError, ChainClientFactory, ChainQuery, DelegationEntry, LcdClient,
    LcdClientFactory, ValidatorReward,
};
