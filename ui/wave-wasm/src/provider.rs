//! `window.ethereum` (EIP-1193) as a [`WalletProvider`].

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wv_chain_client::{ProviderError, WalletProvider};

pub struct InjectedProvider {
    ethereum: JsValue,
}

impl InjectedProvider {
    /// Returns the injected provider, or `None` when no wallet extension is
    /// installed.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum })
    }

    fn request_fn(&self) -> Result<Function, ProviderError> {
        Reflect::get(&self.ethereum, &JsValue::from_str("request"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::Transport("window.ethereum has no request()".to_owned()))
    }
}

/// Maps a rejected EIP-1193 promise (`{ code, message }`) onto [`ProviderError`].
fn js_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64());
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"));

    match code {
        Some(code) => ProviderError::Rpc {
            code: code as i64,
            message,
        },
        None => ProviderError::Transport(message),
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = json!({ "method": method, "params": params })
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

        let returned = self.request_fn()?.call1(&self.ethereum, &args).map_err(js_error)?;
        let promise = returned
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::InvalidResponse("request() did not return a promise".to_owned()))?;
        let result = JsFuture::from(promise).await.map_err(js_error)?;

        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
