use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use wv_abi::AbiError;
use wv_api_types::{FilterId, NewWaveEvent, RawWave, TxHash, WalletAddress};

pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CALL: &str = "eth_call";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
pub const ETH_NEW_FILTER: &str = "eth_newFilter";
pub const ETH_GET_FILTER_CHANGES: &str = "eth_getFilterChanges";
pub const ETH_UNINSTALL_FILTER: &str = "eth_uninstallFilter";

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED: i64 = 4001;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("provider transport failure: {0}")]
    Transport(String),
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rpc { code, .. } if *code == USER_REJECTED)
    }

    pub fn is_method_not_found(&self) -> bool {
        matches!(self, ProviderError::Rpc { code, .. } if *code == METHOD_NOT_FOUND)
    }
}

/// An EIP-1193 style wallet provider: a browser-injected `window.ethereum`,
/// a JSON-RPC node, or a test double.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Pause between polls of receipts and filters.
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("abi: {0}")]
    Abi(#[from] AbiError),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Parses a JSON-RPC hex quantity such as `"0x1b4"`.
pub fn parse_quantity(value: &Value) -> ContractResult<u64> {
    let text = value
        .as_str()
        .ok_or_else(|| ContractError::Malformed(format!("expected hex quantity, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::Malformed(format!("quantity without 0x prefix: {text}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|err| ContractError::Malformed(format!("bad quantity {text}: {err}")))
}

pub fn to_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Reads a list of addresses as returned by `eth_accounts` / `eth_requestAccounts`.
pub fn parse_accounts(value: Value) -> Result<Vec<WalletAddress>, ProviderError> {
    let accounts: Vec<String> = serde_json::from_value(value)
        .map_err(|err| ProviderError::InvalidResponse(format!("accounts: {err}")))?;
    Ok(accounts.into_iter().map(WalletAddress).collect())
}

/// Accounts the user has already authorized; never prompts.
pub async fn authorized_accounts<P: WalletProvider>(
    provider: &P,
) -> Result<Vec<WalletAddress>, ProviderError> {
    parse_accounts(provider.request(ETH_ACCOUNTS, json!([])).await?)
}

/// Asks the user to authorize accounts; may suspend until they answer.
pub async fn request_accounts<P: WalletProvider>(
    provider: &P,
) -> Result<Vec<WalletAddress>, ProviderError> {
    parse_accounts(provider.request(ETH_REQUEST_ACCOUNTS, json!([])).await?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    block_number: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogEntry {
    topics: Vec<String>,
    data: String,
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    block_number: Option<Value>,
    #[serde(default)]
    log_index: Option<Value>,
    #[serde(default)]
    removed: bool,
}

/// Typed binding to a deployed WavePortal contract.
pub struct WavePortal<P> {
    address: String,
    provider: Arc<P>,
}

impl<P> Clone for WavePortal<P> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: WalletProvider> WavePortal<P> {
    pub fn new(address: impl Into<String>, provider: Arc<P>) -> Self {
        Self {
            address: address.into(),
            provider,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    async fn call(&self, data: Vec<u8>) -> ContractResult<Vec<u8>> {
        let params = json!([
            { "to": self.address, "data": wv_abi::to_hex_prefixed(&data) },
            "latest"
        ]);
        let result = self.provider.request(ETH_CALL, params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| ContractError::Malformed(format!("eth_call returned {result}")))?;
        Ok(wv_abi::from_hex(hex)?)
    }

    pub async fn get_total_wave_count(&self) -> ContractResult<u64> {
        let data = self
            .call(wv_abi::encode_total_count_call())
            .await?;
        Ok(wv_abi::decode_total_count(&data)?)
    }

    /// All waves in contract storage order.
    pub async fn get_all_waves(&self) -> ContractResult<Vec<RawWave>> {
        let data = self
            .call(wv_abi::encode_all_waves_call())
            .await?;
        Ok(wv_abi::decode_all_waves(&data)?)
    }

    /// Submits `wave(message)` signed by `from`. Returns once the provider
    /// has accepted the transaction, not when it is mined.
    pub async fn send_wave(
        &self,
        from: &WalletAddress,
        message: &str,
        gas_limit: u64,
    ) -> ContractResult<TxHash> {
        let params = json!([{
            "from": from.0,
            "to": self.address,
            "data": wv_abi::to_hex_prefixed(&wv_abi::encode_wave_call(message)),
            "gas": to_quantity(gas_limit),
        }]);
        let result = self.provider.request(ETH_SEND_TRANSACTION, params).await?;
        result
            .as_str()
            .map(|hash| TxHash(hash.to_owned()))
            .ok_or_else(|| ContractError::Malformed(format!("eth_sendTransaction returned {result}")))
    }

    /// Polls for the receipt until the transaction is mined. No timeout.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: &TxHash,
        poll_interval: Duration,
    ) -> ContractResult<Receipt> {
        loop {
            let result = self
                .provider
                .request(ETH_GET_TRANSACTION_RECEIPT, json!([tx_hash.0]))
                .await?;

            if result.is_null() {
                debug!("transaction {} not mined yet", tx_hash);
                self.provider.sleep(poll_interval).await;
                continue;
            }

            let receipt: ReceiptResponse = serde_json::from_value(result)
                .map_err(|err| ContractError::Malformed(format!("receipt: {err}")))?;

            // Pre-byzantium receipts carry no status; treat them as success.
            if let Some(status) = receipt.status.as_ref() {
                if parse_quantity(status)? == 0 {
                    return Err(ContractError::Reverted(tx_hash.clone()));
                }
            }

            let block_number = receipt.block_number.as_ref().map(parse_quantity).transpose()?;
            return Ok(Receipt {
                tx_hash: tx_hash.clone(),
                block_number,
            });
        }
    }

    pub async fn install_new_wave_filter(&self) -> ContractResult<FilterId> {
        let topic = wv_abi::to_hex_prefixed(wv_abi::new_wave_topic());
        let params = json!([{ "address": self.address, "topics": [topic] }]);
        let result = self.provider.request(ETH_NEW_FILTER, params).await?;
        result
            .as_str()
            .map(|id| FilterId(id.to_owned()))
            .ok_or_else(|| ContractError::Malformed(format!("eth_newFilter returned {result}")))
    }

    /// Fetches logs emitted since the previous poll of `filter`. Logs that
    /// fail to decode or were removed by a reorg are skipped.
    pub async fn poll_new_waves(&self, filter: &FilterId) -> ContractResult<Vec<NewWaveEvent>> {
        let result = self
            .provider
            .request(ETH_GET_FILTER_CHANGES, json!([filter.0]))
            .await?;
        let logs: Vec<LogEntry> = serde_json::from_value(result)
            .map_err(|err| ContractError::Malformed(format!("filter changes: {err}")))?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            if log.removed {
                continue;
            }
            let decoded = wv_abi::from_hex(&log.data)
                .and_then(|data| wv_abi::decode_new_wave(&log.topics, &data));
            match decoded {
                Ok(mut event) => {
                    event.tx_hash = log.transaction_hash.map(TxHash);
                    event.block_number = log
                        .block_number
                        .as_ref()
                        .and_then(|value| parse_quantity(value).ok());
                    event.log_index = log
                        .log_index
                        .as_ref()
                        .and_then(|value| parse_quantity(value).ok());
                    events.push(event);
                }
                Err(err) => warn!("skipping undecodable NewWave log: {err}"),
            }
        }
        Ok(events)
    }

    pub async fn uninstall_filter(&self, filter: &FilterId) -> ContractResult<bool> {
        let result = self
            .provider
            .request(ETH_UNINSTALL_FILTER, json!([filter.0]))
            .await?;
        Ok(result.as_bool().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wv_abi::{Address, NewWave, SolEvent, U256};

    /// Replays canned responses keyed by method name and records every request.
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<Vec<(String, Result<Value, ProviderError>)>>,
        seen: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedProvider {
        fn push(&self, method: &str, response: Result<Value, ProviderError>) {
            self.responses
                .lock()
                .expect("lock")
                .push((method.to_owned(), response));
        }
    }

    #[async_trait]
    impl WalletProvider for ScriptedProvider {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
            self.seen
                .lock()
                .expect("lock")
                .push((method.to_owned(), params));
            let mut responses = self.responses.lock().expect("lock");
            let index = responses
                .iter()
                .position(|(m, _)| m == method)
                .unwrap_or_else(|| panic!("unscripted call to {method}"));
            responses.remove(index).1
        }

        async fn sleep(&self, _duration: Duration) {}
    }

    fn portal(provider: &Arc<ScriptedProvider>) -> WavePortal<ScriptedProvider> {
        WavePortal::new("0x00000000000000000000000000000000000000c0", Arc::clone(provider))
    }

    #[test]
    fn quantities_round_trip_through_hex() {
        assert_eq!(parse_quantity(&json!("0x1b4")).expect("valid"), 436);
        assert_eq!(to_quantity(300_000), "0x493e0");
        assert!(parse_quantity(&json!("12")).is_err());
        assert!(parse_quantity(&json!(12)).is_err());
    }

    #[test]
    fn user_rejection_is_recognised() {
        let err = ProviderError::Rpc {
            code: USER_REJECTED,
            message: "User rejected the request.".to_owned(),
        };
        assert!(err.is_user_rejection());
        assert!(!err.is_method_not_found());
    }

    #[tokio::test]
    async fn send_wave_carries_gas_limit_and_calldata() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push(ETH_SEND_TRANSACTION, Ok(json!("0xabc")));

        let hash = portal(&provider)
            .send_wave(&WalletAddress("0x01".to_owned()), "hello", 300_000)
            .await
            .expect("sent");

        assert_eq!(hash, TxHash("0xabc".to_owned()));
        let seen = provider.seen.lock().expect("lock");
        let tx = &seen[0].1[0];
        assert_eq!(tx["gas"], "0x493e0");
        assert_eq!(
            tx["data"],
            wv_abi::to_hex_prefixed(&wv_abi::encode_wave_call("hello"))
        );
    }

    #[tokio::test]
    async fn waits_through_pending_receipts() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push(ETH_GET_TRANSACTION_RECEIPT, Ok(Value::Null));
        provider.push(ETH_GET_TRANSACTION_RECEIPT, Ok(Value::Null));
        provider.push(
            ETH_GET_TRANSACTION_RECEIPT,
            Ok(json!({ "status": "0x1", "blockNumber": "0x10" })),
        );

        let receipt = portal(&provider)
            .wait_for_confirmation(&TxHash("0xabc".to_owned()), Duration::from_millis(1))
            .await
            .expect("mined");

        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(provider.seen.lock().expect("lock").len(), 3);
    }

    #[tokio::test]
    async fn reverted_receipt_is_an_error() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push(
            ETH_GET_TRANSACTION_RECEIPT,
            Ok(json!({ "status": "0x0", "blockNumber": "0x10" })),
        );

        let err = portal(&provider)
            .wait_for_confirmation(&TxHash("0xdead".to_owned()), Duration::ZERO)
            .await
            .expect_err("reverted");
        assert!(matches!(err, ContractError::Reverted(hash) if hash.0 == "0xdead"));
    }

    #[tokio::test]
    async fn filter_changes_skip_removed_and_foreign_logs() {
        let log = NewWave {
            from: Address::repeat_byte(0xab),
            timestamp: U256::from(5_u64),
            message: "live".to_owned(),
        }
        .encode_log_data();
        let topic = wv_abi::to_hex_prefixed(log.topics()[0]);
        let sender = wv_abi::to_hex_prefixed(log.topics()[1]);
        let data = wv_abi::to_hex_prefixed(&log.data);

        let provider = Arc::new(ScriptedProvider::default());
        provider.push(
            ETH_GET_FILTER_CHANGES,
            Ok(json!([
                { "topics": [topic, sender], "data": data, "transactionHash": "0x01", "blockNumber": "0x2", "logIndex": "0x3" },
                { "topics": [topic, sender], "data": data, "removed": true },
                { "topics": ["0x00"], "data": "0x" },
            ])),
        );

        let events = portal(&provider)
            .poll_new_waves(&FilterId("0x1".to_owned()))
            .await
            .expect("polled");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "live");
        assert_eq!(events[0].tx_hash, Some(TxHash("0x01".to_owned())));
        assert_eq!(events[0].block_number, Some(2));
        assert_eq!(events[0].log_index, Some(3));
        assert_eq!(events[0].from.0, format!("0x{}", "ab".repeat(20)));
    }

    #[tokio::test]
    async fn provider_errors_propagate_from_reads() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push(
            ETH_CALL,
            Err(ProviderError::Transport("connection refused".to_owned())),
        );

        let err = portal(&provider)
            .get_total_wave_count()
            .await
            .expect_err("transport failure");
        assert!(matches!(err, ContractError::Provider(ProviderError::Transport(_))));
    }
}
