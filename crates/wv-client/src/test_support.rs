//! In-memory wallet provider that plays the WavePortal contract.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use wv_abi::{
    Address, NewWave, SolCall, SolEvent, SolValue, U256, Wave, getAllWavesCall,
    getTotalWaveCountCall, waveCall,
};
use wv_chain_client::{
    ETH_ACCOUNTS, ETH_CALL, ETH_GET_FILTER_CHANGES, ETH_GET_TRANSACTION_RECEIPT, ETH_NEW_FILTER,
    ETH_REQUEST_ACCOUNTS, ETH_SEND_TRANSACTION, ETH_UNINSTALL_FILTER, ProviderError, USER_REJECTED,
    WalletProvider,
};

pub(crate) const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub(crate) const BOB: &str = "0x0000000000000000000000000000000000000b0b";

#[derive(Default)]
struct Chain {
    authorized: Vec<String>,
    approve_as: Option<String>,
    waves: Vec<(String, String, u64)>,
    clock: u64,
    filters: BTreeMap<String, Vec<Value>>,
    next_filter: u64,
    logs_emitted: u64,
    uninstalled: Vec<String>,
    sent: Vec<Value>,
    accounts_error: Option<ProviderError>,
    receipt_error: Option<ProviderError>,
    call_error: Option<ProviderError>,
    revert: bool,
}

#[derive(Default)]
pub(crate) struct MockProvider {
    chain: Mutex<Chain>,
}

impl MockProvider {
    fn with<R>(&self, f: impl FnOnce(&mut Chain) -> R) -> R {
        f(&mut self.chain.lock().expect("mock lock"))
    }

    pub(crate) fn authorize(&self, account: &str) {
        self.with(|c| c.authorized.push(account.to_owned()));
    }

    /// `Some(addr)` approves the next authorization prompt, `None` rejects it.
    pub(crate) fn approve_as(&self, account: Option<&str>) {
        self.with(|c| c.approve_as = account.map(str::to_owned));
    }

    pub(crate) fn store_wave(&self, from: &str, timestamp: u64, message: &str) {
        self.with(|c| {
            c.waves.push((from.to_owned(), message.to_owned(), timestamp));
            c.clock = c.clock.max(timestamp);
        });
    }

    /// Emits a `NewWave` log to every installed filter without touching storage.
    pub(crate) fn emit(&self, from: &str, timestamp: u64, message: &str) {
        self.with(|c| push_log(c, from, timestamp, message));
    }

    pub(crate) fn fail_accounts(&self, err: ProviderError) {
        self.with(|c| c.accounts_error = Some(err));
    }

    pub(crate) fn fail_receipts(&self, err: ProviderError) {
        self.with(|c| c.receipt_error = Some(err));
    }

    pub(crate) fn fail_calls(&self, err: ProviderError) {
        self.with(|c| c.call_error = Some(err));
    }

    pub(crate) fn revert_transactions(&self) {
        self.with(|c| c.revert = true);
    }

    pub(crate) fn sent_transactions(&self) -> Vec<Value> {
        self.with(|c| c.sent.clone())
    }

    pub(crate) fn uninstalled_filters(&self) -> Vec<String> {
        self.with(|c| c.uninstalled.clone())
    }
}

fn address(address: &str) -> Address {
    wv_abi::parse_address(address).expect("test address")
}

/// Every emitted log gets its own transaction hash, so identical waves stay
/// distinct logs.
fn push_log(chain: &mut Chain, from: &str, timestamp: u64, message: &str) {
    chain.logs_emitted += 1;
    let encoded = NewWave {
        from: address(from),
        timestamp: U256::from(timestamp),
        message: message.to_owned(),
    }
    .encode_log_data();
    let topics: Vec<String> = encoded.topics().iter().map(wv_abi::to_hex_prefixed).collect();
    let log = json!({
        "topics": topics,
        "data": wv_abi::to_hex_prefixed(&encoded.data),
        "blockNumber": "0x1",
        "transactionHash": format!("0x{:064x}", 0x1000 + chain.logs_emitted),
        "logIndex": "0x0",
    });
    for pending in chain.filters.values_mut() {
        pending.push(log.clone());
    }
}

fn handle_call(chain: &Chain, params: &Value) -> Result<Value, ProviderError> {
    if let Some(err) = &chain.call_error {
        return Err(err.clone());
    }
    let data = params[0]["data"].as_str().expect("call data");
    let data = wv_abi::from_hex(data).expect("hex call data");

    let output = if data[..4] == getTotalWaveCountCall::SELECTOR {
        U256::from(chain.waves.len()).abi_encode()
    } else if data[..4] == getAllWavesCall::SELECTOR {
        let stored: Vec<Wave> = chain
            .waves
            .iter()
            .map(|(from, message, timestamp)| Wave {
                waver: address(from),
                message: message.clone(),
                timestamp: U256::from(*timestamp),
            })
            .collect();
        stored.abi_encode()
    } else {
        panic!("unknown selector {:?}", &data[..4]);
    };
    Ok(json!(wv_abi::to_hex_prefixed(&output)))
}

fn handle_send(chain: &mut Chain, params: &Value) -> Value {
    let tx = params[0].clone();
    let from = tx["from"].as_str().expect("from").to_owned();
    let data = wv_abi::from_hex(tx["data"].as_str().expect("data")).expect("hex data");
    let message = waveCall::abi_decode(&data).expect("wave calldata")._message;

    chain.sent.push(tx);
    let hash = format!("0x{:064x}", chain.sent.len());
    if !chain.revert {
        chain.clock += 1;
        let timestamp = chain.clock;
        chain.waves.push((from.clone(), message.clone(), timestamp));
        push_log(chain, &from, timestamp, &message);
    }
    json!(hash)
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.with(|chain| match method {
            ETH_ACCOUNTS => match &chain.accounts_error {
                Some(err) => Err(err.clone()),
                None => Ok(json!(chain.authorized)),
            },
            ETH_REQUEST_ACCOUNTS => match chain.approve_as.clone() {
                Some(account) => {
                    chain.authorized.push(account);
                    Ok(json!(chain.authorized))
                }
                None => Err(ProviderError::Rpc {
                    code: USER_REJECTED,
                    message: "User rejected the request.".to_owned(),
                }),
            },
            ETH_CALL => handle_call(chain, &params),
            ETH_SEND_TRANSACTION => Ok(handle_send(chain, &params)),
            ETH_GET_TRANSACTION_RECEIPT => match &chain.receipt_error {
                Some(err) => Err(err.clone()),
                None => Ok(json!({
                    "status": if chain.revert { "0x0" } else { "0x1" },
                    "blockNumber": "0x1",
                })),
            },
            ETH_NEW_FILTER => {
                chain.next_filter += 1;
                let id = format!("0x{:x}", chain.next_filter);
                chain.filters.insert(id.clone(), Vec::new());
                Ok(json!(id))
            }
            ETH_GET_FILTER_CHANGES => {
                let id = params[0].as_str().expect("filter id");
                let logs = chain
                    .filters
                    .get_mut(id)
                    .map(std::mem::take)
                    .unwrap_or_default();
                Ok(json!(logs))
            }
            ETH_UNINSTALL_FILTER => {
                let id = params[0].as_str().expect("filter id").to_owned();
                let known = chain.filters.remove(&id).is_some();
                chain.uninstalled.push(id);
                Ok(json!(known))
            }
            other => panic!("unexpected provider call {other}"),
        })
    }

    async fn sleep(&self, _duration: Duration) {}
}
