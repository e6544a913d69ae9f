// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain directory (cosmos.directory) client and profile cache.
//!
//! ## Caching
//!
//! - The chain summary list is cached process-wide with a TTL
//! - Resolved profiles are cached until the summary list is replaced
//! - A stale summary list is served when a refetch fails
//!
//! ## Resolution
//!
//! A chain name resolves to a [`ChainProfile`] from its directory summary,
//! its chain record (bech32 prefix) and its asset list. Chains missing from
//! the directory, or whose prefix or exponent cannot be established, are
//! rejected as `ChainUnsupported`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{get_json, http_client, ProviderError};
use crate::cosmos::address::validate_prefix;
use crate::models::{ChainFailure, ChainProfile, FailureKind, TokenAsset};

/// Asset lists fetched at once when listing every token.
const TOKEN_FETCH_CONCURRENCY: usize = 8;

// =============================================================================
// Wire types
// =============================================================================

/// One entry of the directory's chain list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub name: String,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub denom: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub coingecko_id: Option<String>,
    #[serde(default)]
    pub best_apis: BestApis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestApis {
    #[serde(default)]
    pub rpc: Vec<ApiEndpoint>,
    #[serde(default)]
    pub rest: Vec<ApiEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub address: String,
}

#[derive(Debug, Deserialize)]
struct ChainsResponse {
    #[serde(default)]
    chains: Vec<ChainSummary>,
}

/// The part of a chain record the resolver needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainData {
    pub bech32_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetList {
    #[serde(default)]
    pub assets: Vec<DirectoryAsset>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectoryAsset {
    pub base: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub denom_units: Vec<DenomUnit>,
    #[serde(default)]
    pub coingecko_id: Option<String>,
    #[serde(default, rename = "logo_URIs")]
    pub logo_uris: Option<LogoUris>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DenomUnit {
    pub denom: String,
    #[serde(default)]
    pub exponent: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogoUris {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

impl DirectoryAsset {
    /// Exponent of the display unit, or the largest unit when no display
    /// unit is declared.
    pub fn decimals(&self) -> Option<u32> {
        let display = self.display.as_deref();
        self.denom_units
            .iter()
            .find(|unit| Some(unit.denom.as_str()) == display)
            .or_else(|| self.denom_units.iter().max_by_key(|unit| unit.exponent))
            .map(|unit| unit.exponent)
    }

    pub fn to_token(&self, chain: &str) -> TokenAsset {
        TokenAsset {
            chain: chain.to_string(),
            base: self.base.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals().unwrap_or(0),
            coingecko_id: self.coingecko_id.clone(),
            logo_uri: self
                .logo_uris
                .as_ref()
                .and_then(|logo| logo.png.clone().or_else(|| logo.svg.clone())),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

#[async_trait]
pub trait ChainDirectory: Send + Sync {
    async fn chains(&self) -> Result<Vec<ChainSummary>, ProviderError>;

    async fn chain_data(&self, name: &str) -> Result<ChainData, ProviderError>;

    async fn token_data(&self, name: &str) -> Result<AssetList, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct CosmosDirectoryClient {
    base_url: String,
    http: Client,
}

impl CosmosDirectoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ChainDirectory for CosmosDirectoryClient {
    async fn chains(&self) -> Result<Vec<ChainSummary>, ProviderError> {
        let response: ChainsResponse = get_json(&self.http, &self.base_url, &[]).await?;
        Ok(response.chains)
    }

    async fn chain_data(&self, name: &str) -> Result<ChainData, ProviderError> {
        let url = format!("{}/{name}/chain", self.base_url);
        get_json(&self.http, &url, &[]).await
    }

    async fn token_data(&self, name: &str) -> Result<AssetList, ProviderError> {
        let url = format!("{}/{name}/assetlist", self.base_url);
        get_json(&self.http, &url, &[]).await
    }
}

// =============================================================================
// Profile resolution
// =============================================================================

/// Service-wide inputs to profile resolution.
#[derive(Debug, Clone, Default)]
pub struct ProfileSettings {
    /// Proxy base used when a chain lists no REST endpoint (`{base}/{name}`).
    pub rest_fallback: String,
    /// Proxy base used when a chain lists no RPC endpoint (`{base}/{name}`).
    pub rpc_fallback: String,
    /// Extra reward decimals per chain name.
    pub reward_offsets: HashMap<String, u32>,
}

/// A resolved chain together with its asset list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChain {
    pub profile: ChainProfile,
    pub assets: Vec<TokenAsset>,
}

/// Build a profile from directory data.
pub fn build_profile(
    summary: &ChainSummary,
    bech32_prefix: &str,
    assets: &[DirectoryAsset],
    settings: &ProfileSettings,
) -> Result<ChainProfile, String> {
    validate_prefix(bech32_prefix).map_err(|e| e.to_string())?;

    let native_denom = summary
        .denom
        .clone()
        .or_else(|| assets.first().map(|asset| asset.base.clone()))
        .ok_or_else(|| format!("chain `{}` declares no native denom", summary.name))?;

    let decimal_exponent = summary
        .decimals
        .or_else(|| {
            assets
                .iter()
                .find(|asset| asset.base == native_denom)
                .and_then(DirectoryAsset::decimals)
        })
        .ok_or_else(|| format!("chain `{}` declares no decimals", summary.name))?;

    let endpoint = |apis: &[ApiEndpoint], fallback: &str| {
        apis.first()
            .map(|api| api.address.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/{}", fallback.trim_end_matches('/'), summary.name))
    };

    Ok(ChainProfile {
        name: summary.name.clone(),
        chain_id: summary.chain_id.clone(),
        address_prefix: bech32_prefix.to_string(),
        native_denom,
        decimal_exponent,
        rpc_endpoint: endpoint(&summary.best_apis.rpc, &settings.rpc_fallback),
        rest_endpoint: endpoint(&summary.best_apis.rest, &settings.rest_fallback),
        coingecko_id: summary.coingecko_id.clone(),
        reward_denom_offset: settings
            .reward_offsets
            .get(&summary.name)
            .copied()
            .unwrap_or(0),
    })
}

struct SummaryEntry {
    chains: Arc<BTreeMap<String, ChainSummary>>,
    fetched_at: Instant,
}

/// Process-wide cache in front of a [`ChainDirectory`].
pub struct DirectoryCache {
    directory: Arc<dyn ChainDirectory>,
    settings: ProfileSettings,
    ttl: Duration,
    summaries: RwLock<Option<SummaryEntry>>,
    resolved: RwLock<HashMap<String, ResolvedChain>>,
}

impl DirectoryCache {
    pub fn new(directory: Arc<dyn ChainDirectory>, settings: ProfileSettings, ttl: Duration) -> Self {
        Self {
            directory,
            settings,
            ttl,
            summaries: RwLock::new(None),
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Directory chain list keyed by name.
    pub async fn summaries(&self) -> Result<Arc<BTreeMap<String, ChainSummary>>, ProviderError> {
        {
            let cache = self.summaries.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.chains.clone());
                }
            }
        }

        match self.refresh().await {
            Ok(_) => {}
            Err(e) => {
                let cache = self.summaries.read().await;
                if let Some(entry) = &*cache {
                    tracing::warn!(error = %e, "Directory refetch failed, serving stale chain list");
                    return Ok(entry.chains.clone());
                }
                return Err(e);
            }
        }

        let cache = self.summaries.read().await;
        cache
            .as_ref()
            .map(|entry| entry.chains.clone())
            .ok_or_else(|| ProviderError::InvalidResponse("chain list vanished".into()))
    }

    /// Refetch the chain list and drop every resolved profile.
    pub async fn refresh(&self) -> Result<usize, ProviderError> {
        let chains: BTreeMap<String, ChainSummary> = self
            .directory
            .chains()
            .await?
            .into_iter()
            .map(|chain| (chain.name.clone(), chain))
            .collect();
        let count = chains.len();

        *self.summaries.write().await = Some(SummaryEntry {
            chains: Arc::new(chains),
            fetched_at: Instant::now(),
        });
        self.resolved.write().await.clear();

        tracing::info!(chains = count, "Chain directory refreshed");
        Ok(count)
    }

    /// Whether a chain list is held, fresh or stale.
    pub async fn is_loaded(&self) -> bool {
        self.summaries.read().await.is_some()
    }

    pub async fn summary(&self, name: &str) -> Result<Option<ChainSummary>, ProviderError> {
        Ok(self.summaries().await?.get(name).cloned())
    }

    /// Resolve one chain name.
    pub async fn resolve(&self, name: &str) -> Result<ResolvedChain, ChainFailure> {
        let summaries = self
            .summaries()
            .await
            .map_err(|e| ChainFailure::new(name, e.kind(), e.to_string()))?;

        let summary = summaries
            .get(name)
            .ok_or_else(|| ChainFailure::unsupported(name))?;

        if let Some(resolved) = self.resolved.read().await.get(name) {
            return Ok(resolved.clone());
        }

        let (chain_data, token_data) = tokio::join!(
            self.directory.chain_data(name),
            self.directory.token_data(name),
        );

        let chain_data =
            chain_data.map_err(|e| ChainFailure::new(name, e.kind(), e.to_string()))?;

        let assets = token_data.map(|list| list.assets).unwrap_or_else(|e| {
            tracing::warn!(chain = %name, error = %e, "Asset list unavailable");
            Vec::new()
        });

        let profile = build_profile(summary, &chain_data.bech32_prefix, &assets, &self.settings)
            .map_err(|message| ChainFailure::new(name, FailureKind::ChainUnsupported, message))?;

        let resolved = ResolvedChain {
            profile,
            assets: assets.iter().map(|asset| asset.to_token(name)).collect(),
        };

        self.resolved
            .write()
            .await
            .insert(name.to_string(), resolved.clone());

        Ok(resolved)
    }

    /// Resolve several chain names, preserving order.
    pub async fn resolve_all(&self, names: &[String]) -> Vec<Result<ResolvedChain, ChainFailure>> {
        futures::future::join_all(names.iter().map(|name| self.resolve(name))).await
    }

    /// Every asset of every directory chain. Chains whose asset list cannot
    /// be fetched are skipped.
    pub async fn all_tokens(&self) -> Result<Vec<TokenAsset>, ProviderError> {
        let summaries = self.summaries().await?;

        let lists: Vec<(String, Result<AssetList, ProviderError>)> =
            stream::iter(summaries.keys().cloned())
                .map(|name| async move {
                    let list = self.directory.token_data(&name).await;
                    (name, list)
                })
                .buffered(TOKEN_FETCH_CONCURRENCY)
                .collect()
                .await;

        let mut tokens = Vec::new();
        for (name, list) in lists {
            match list {
                Ok(list) => tokens.extend(list.assets.iter().map(|asset| asset.to_token(&name))),
                Err(e) => tracing::warn!(chain = %name, error = %e, "Skipping chain asset list"),
            }
        }
        Ok(tokens)
    }
}
