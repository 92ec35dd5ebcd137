use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use wv_chain_client::{ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS, ProviderError, WalletProvider};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC over HTTP wallet provider for a node that manages its own
/// accounts (anvil, hardhat, geth `--dev`).
///
/// Reads `WAVE_RPC_URL` from environment at construction time
/// (default: `http://localhost:8545`).
pub struct HttpProvider {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("WAVE_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, method: &str, params: Value) -> Result<RpcResponse> {
        let envelope = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .with_context(|| format!("{method} transport"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{method} HTTP {status}: {text}");
        }

        response
            .json::<RpcResponse>()
            .await
            .with_context(|| format!("{method} parse"))
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let response = self
            .post(method, params)
            .await
            .map_err(|err| ProviderError::Transport(format!("{err:#}")))?;
        response.into_result()
    }
}

// ── JSON-RPC 2.0 envelope ────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, ProviderError> {
        match (self.error, self.result) {
            (Some(err), _) => Err(ProviderError::Rpc {
                code: err.code,
                message: err.message,
            }),
            // A missing result is a legitimate `null` (e.g. pending receipt).
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}

#[async_trait]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        debug!(method, "json-rpc request");
        match self.call(method, params.clone()).await {
            // Plain nodes have no interactive authorization step.
            Err(err) if method == ETH_REQUEST_ACCOUNTS && err.is_method_not_found() => {
                info!("{} unsupported by node, falling back to {}", ETH_REQUEST_ACCOUNTS, ETH_ACCOUNTS);
                self.call(ETH_ACCOUNTS, params).await
            }
            other => other,
        }
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
