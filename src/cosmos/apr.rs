// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staking APR.
//!
//! Most chains derive APR from the mint module's annual inflation divided by
//! the bonded ratio. Osmosis mints per epoch, so its APR is computed from the
//! staking share of the epoch provisions annualised over the epoch duration.

use std::time::Duration;

use crate::aggregate::fanout::bounded;
use crate::cosmos::denom::parse_amount;
use crate::cosmos::types::EpochInfo;
use crate::cosmos::{ChainClientError, ChainQuery};
use crate::models::ChainProfile;

pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AprError {
    #[error(transparent)]
    Chain(#[from] ChainClientError),

    #[error("Invalid staking data: {0}")]
    InvalidData(String),
}

/// Inflation divided by the bonded ratio.
pub fn standard_apr(inflation: f64, bonded: f64, supply: f64) -> Result<f64, AprError> {
    let ratio = bonded_ratio(bonded, supply)?;
    Ok(inflation / ratio)
}

/// Osmosis epoch-provision APR.
pub fn osmosis_apr(
    staking_proportion: f64,
    epoch_provisions: f64,
    epoch_duration_secs: f64,
    supply: f64,
    bonded: f64,
) -> Result<f64, AprError> {
    if epoch_duration_secs <= 0.0 {
        return Err(AprError::InvalidData("epoch duration is zero".into()));
    }
    let ratio = bonded_ratio(bonded, supply)?;

    let minted_per_epoch = staking_proportion * epoch_provisions;
    let minted_per_year = minted_per_epoch * SECONDS_PER_YEAR / epoch_duration_secs;
    let base_inflation = minted_per_year / supply;

    Ok(base_inflation / ratio)
}

fn bonded_ratio(bonded: f64, supply: f64) -> Result<f64, AprError> {
    if supply <= 0.0 || bonded <= 0.0 {
        return Err(AprError::InvalidData(format!(
            "bonded {bonded} of supply {supply}"
        )));
    }
    Ok(bonded / supply)
}

/// Parse a protobuf JSON duration such as `"86400s"`.
pub fn parse_duration_secs(raw: &str) -> Option<f64> {
    raw.trim()
        .strip_suffix('s')
        .and_then(|secs| secs.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
}

/// Duration of the epoch named `identifier`.
pub fn epoch_duration_secs(epochs: &[EpochInfo], identifier: &str) -> Option<f64> {
    epochs
        .iter()
        .find(|epoch| epoch.identifier == identifier)
        .and_then(|epoch| parse_duration_secs(&epoch.duration))
}

/// Chains minting per epoch through the Osmosis mint module.
pub fn uses_epoch_minting(profile: &ChainProfile) -> bool {
    match &profile.chain_id {
        Some(chain_id) => chain_id.starts_with("osmosis"),
        None => profile.name == "osmosis",
    }
}

/// Computes a chain's APR from live chain state.
#[derive(Debug, Clone, Copy)]
pub struct AprCalculator {
    timeout: Duration,
}

impl AprCalculator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn chain_apr(
        &self,
        client: &dyn ChainQuery,
        profile: &ChainProfile,
    ) -> Result<f64, AprError> {
        let (pool, supply) = tokio::try_join!(
            bounded(self.timeout, "staking pool", client.staking_pool()),
            bounded(self.timeout, "supply", client.supply_of(&profile.native_denom)),
        )?;

        let bonded = parse_amount(&pool.bonded_tokens).map_err(AprError::InvalidData)?;
        let supply = parse_amount(&supply.amount).map_err(AprError::InvalidData)?;

        if uses_epoch_minting(profile) {
            return self.epoch_apr(client, supply, bonded).await;
        }

        let inflation = bounded(self.timeout, "inflation", client.inflation()).await?;
        standard_apr(inflation, bonded, supply)
    }

    async fn epoch_apr(
        &self,
        client: &dyn ChainQuery,
        supply: f64,
        bonded: f64,
    ) -> Result<f64, AprError> {
        let (params, epochs, provisions) = tokio::try_join!(
            bounded(self.timeout, "mint params", client.osmosis_mint_params()),
            bounded(self.timeout, "epochs", client.osmosis_epochs()),
            bounded(self.timeout, "epoch provisions", client.osmosis_epoch_provisions()),
        )?;

        let staking_proportion = params
            .distribution_proportions
            .staking
            .trim()
            .parse::<f64>()
            .map_err(|_| {
                AprError::InvalidData(format!(
                    "staking proportion is not a number: {}",
                    params.distribution_proportions.staking
                ))
            })?;

        let duration = epoch_duration_secs(&epochs, &params.epoch_identifier).ok_or_else(|| {
            AprError::InvalidData(format!("no epoch named `{}`", params.epoch_identifier))
        })?;

        osmosis_apr(staking_proportion, provisions, duration, supply, bonded)
    }
}
