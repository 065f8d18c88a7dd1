//! Chain access.
//!
//! Defines the `ChainReader` trait (read-only static calls against a node
//! already bound to one network) plus:
//! - `abi` — selector derivation and word-level encoding/decoding
//! - `escrow` — typed bindings for the escrow token and escrow NFT contracts
//! - `rpc` — JSON-RPC `eth_call` client over HTTP

pub mod abi;
pub mod escrow;
pub mod rpc;

use alloy_primitives::{Address, Bytes};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction over a read-only chain connection.
///
/// Implementors execute a static call at the latest block and return the
/// raw ABI-encoded return data. Transport, node and timeout failures are
/// all reported as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute `data` against contract `to` without mutating state.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}
