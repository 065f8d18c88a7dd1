//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` into strongly-typed structs. The RPC endpoint is
//! referenced by env-var name since provider URLs usually embed an API key.
//! The two escrow addresses arrive as untyped user args and are validated
//! into an [`EscrowConfig`] before any chain call is made.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::str::FromStr;

use crate::types::KeeperError;

/// User-arg name for the escrow-token registry address.
pub const ESCROW_TOKEN_ARG: &str = "escrowToken";
/// User-arg name for the escrow-NFT collection address.
pub const ESCROW_NFT_ARG: &str = "escrowNft";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub keeper: KeeperConfig,
    pub chain: ChainConfig,
    #[serde(default)]
    pub user_args: UserArgs,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeeperConfig {
    pub name: String,
    pub interval_secs: u64,
    #[serde(default)]
    pub run_once: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    pub network: String,
    pub rpc_url_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Per-deployment options, as supplied. Either field may be absent.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserArgs {
    #[serde(default, rename = "escrowToken")]
    pub escrow_token: Option<String>,
    #[serde(default, rename = "escrowNft")]
    pub escrow_nft: Option<String>,
}

impl UserArgs {
    pub fn new(escrow_token: impl Into<String>, escrow_nft: impl Into<String>) -> Self {
        Self {
            escrow_token: Some(escrow_token.into()),
            escrow_nft: Some(escrow_nft.into()),
        }
    }

    /// Replace fields with `ESCROW_TOKEN` / `ESCROW_NFT` when those are set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Replace fields with whatever `lookup` returns for `ESCROW_TOKEN` /
    /// `ESCROW_NFT`. A set-but-empty value replaces too.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("ESCROW_TOKEN") {
            self.escrow_token = Some(token);
        }
        if let Some(nft) = lookup("ESCROW_NFT") {
            self.escrow_nft = Some(nft);
        }
        self
    }
}

/// Validated contract addresses for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowConfig {
    pub escrow_token: Address,
    pub escrow_nft: Address,
}

impl EscrowConfig {
    /// Validate user args. Token is checked before NFT.
    pub fn from_args(args: &UserArgs) -> Result<Self, KeeperError> {
        let escrow_token = parse_address(ESCROW_TOKEN_ARG, args.escrow_token.as_deref())?;
        let escrow_nft = parse_address(ESCROW_NFT_ARG, args.escrow_nft.as_deref())?;
        Ok(Self {
            escrow_token,
            escrow_nft,
        })
    }
}

fn parse_address(field: &'static str, raw: Option<&str>) -> Result<Address, KeeperError> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err(KeeperError::MissingConfig(field));
    }
    // 0x + 40 hex; checksum casing is not enforced
    if raw.len() != 42 || !raw.starts_with("0x") {
        return Err(KeeperError::InvalidAddress {
            field,
            value: raw.to_string(),
        });
    }
    Address::from_str(raw).map_err(|_| KeeperError::InvalidAddress {
        field,
        value: raw.to_string(),
    })
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Reject values that would only fail once the keeper is running.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.keeper.run_once || self.keeper.interval_secs > 0,
            "keeper.interval_secs must be > 0 when run_once is false"
        );
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
