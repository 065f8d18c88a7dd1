//! JSON-RPC chain reader.
//!
//! Issues `eth_call` against the `latest` block over HTTP(S). The endpoint
//! URL usually embeds a provider API key, so it is kept in a `SecretString`
//! and stripped from transport errors.

use alloy_primitives::{hex, Address, Bytes};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::ChainReader;

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `eth_call` request against the latest block.
fn call_body(id: u64, to: Address, data: &Bytes) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "eth_call",
        "params": [
            { "to": to, "data": data },
            "latest"
        ],
    })
}

/// Extract the hex-encoded `result` of an `eth_call` response.
fn parse_call_response(resp: RpcResponse) -> Result<Bytes> {
    if let Some(err) = resp.error {
        anyhow::bail!("JSON-RPC error {}: {}", err.code, err.message);
    }

    let result = resp
        .result
        .context("JSON-RPC response missing 'result' field")?;
    let encoded = result
        .as_str()
        .context("eth_call returned a non-string result")?;

    let raw = hex::decode(encoded)
        .with_context(|| format!("eth_call returned invalid hex: {encoded}"))?;
    Ok(Bytes::from(raw))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct RpcClient {
    http: Client,
    url: SecretString,
    network: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: SecretString, network: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build JSON-RPC HTTP client")?;

        Ok(Self {
            http,
            url,
            network: network.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn network(&self) -> &str {
        &self.network
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = call_body(id, to, &data);

        debug!(network = %self.network, %to, id, "eth_call");

        let resp = self
            .http
            .post(self.url.expose_secret().as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("{}: eth_call request failed", self.network))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("{}: HTTP {status}", self.network);
        }

        let parsed: RpcResponse = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("{}: invalid JSON-RPC response", self.network))?;

        parse_call_response(parsed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
