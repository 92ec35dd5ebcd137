//! Event binding.
//!
//! Wires the two buttons. Async handlers are spawned via
//! `wasm_bindgen_futures::spawn_local`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wv_client::ClientError;

use crate::dom::{self, Elements};
use crate::state;

/// Helper: attach async click handler to an HtmlElement.
macro_rules! on_click_async {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        if let Err(err) = $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref()) {
            tracing::warn!("failed to bind click handler: {err:?}");
        }
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) {
    on_click_async!(els.connect_btn, els, on_connect);
    on_click_async!(els.wave_btn, els, on_wave);
}

async fn on_connect(_els: &Elements) {
    let Some(client) = state::client() else {
        return;
    };
    if let Err(ClientError::ProviderMissing) = client.connect().await {
        dom::alert("Please Install MetaMask!");
    }
    state::rerender();
}

async fn on_wave(els: &Elements) {
    let Some(client) = state::client() else {
        return;
    };
    let message = dom::get_input_value(&els.message_input);

    let input = els.message_input.clone();
    let _ = client
        .submit_wave(&message, move |_| {
            input.set_value("");
            state::rerender();
        })
        .await;
    state::rerender();
}
