// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bech32 address derivation across chains.
//!
//! A Cosmos account is one 20-byte payload; each chain only changes the
//! human-readable prefix. Derivation decodes the payload once and re-encodes
//! it for every chain profile.

use bech32::{Bech32, Hrp};

use crate::models::{ChainProfile, DerivedAddress};

/// Errors produced while decoding or re-encoding addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid address format: {0}")]
    InvalidAddressFormat(String),

    #[error("Invalid bech32 prefix `{prefix}`: {reason}")]
    InvalidPrefix { prefix: String, reason: String },
}

/// Decoded source address: prefix plus payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub prefix: String,
    pub payload: Vec<u8>,
}

/// Decode a bech32 address, verifying its checksum.
pub fn decode_address(address: &str) -> Result<DecodedAddress, AddressError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AddressError::InvalidAddressFormat(
            "address is empty".to_string(),
        ));
    }

    let (hrp, payload) = bech32::decode(trimmed)
        .map_err(|e| AddressError::InvalidAddressFormat(e.to_string()))?;

    if payload.is_empty() {
        return Err(AddressError::InvalidAddressFormat(
            "address has no payload".to_string(),
        ));
    }

    Ok(DecodedAddress {
        prefix: hrp.to_lowercase(),
        payload,
    })
}

/// Encode a payload under the given prefix.
pub fn encode_address(prefix: &str, payload: &[u8]) -> Result<String, AddressError> {
    let hrp = parse_prefix(prefix)?;
    bech32::encode::<Bech32>(hrp, payload).map_err(|e| AddressError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: e.to_string(),
    })
}

/// Check that a prefix can be used as a bech32 human-readable part.
pub fn validate_prefix(prefix: &str) -> Result<(), AddressError> {
    parse_prefix(prefix).map(|_| ())
}

fn parse_prefix(prefix: &str) -> Result<Hrp, AddressError> {
    if prefix.is_empty() {
        return Err(AddressError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "prefix is empty".to_string(),
        });
    }
    Hrp::parse(prefix).map_err(|e| AddressError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: e.to_string(),
    })
}

/// Derive one address per chain from a single source address.
///
/// Fails only if the source address cannot be decoded or a profile carries
/// an unusable prefix; profiles are validated when resolved from the
/// directory, so the latter indicates a programming error upstream.
pub fn derive_addresses(
    source: &str,
    chains: &[ChainProfile],
) -> Result<Vec<DerivedAddress>, AddressError> {
    let decoded = decode_address(source)?;

    chains
        .iter()
        .map(|profile| {
            let address = encode_address(&profile.address_prefix, &decoded.payload)?;
            Ok(DerivedAddress {
                chain_name: profile.name.clone(),
                address,
                profile: profile.clone(),
            })
        })
        .collect()
}
