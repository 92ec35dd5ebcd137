//! Wave Station browser front end.
//!
//! Rust + WASM page that drives a WavePortal contract through the injected
//! `window.ethereum` provider. Only `lifecycle` is built on other targets,
//! so the workspace still builds and tests natively.

pub mod lifecycle;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod events;
#[cfg(target_arch = "wasm32")]
pub mod live;
#[cfg(target_arch = "wasm32")]
pub mod provider;
#[cfg(target_arch = "wasm32")]
pub mod render;
#[cfg(target_arch = "wasm32")]
pub mod state;

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use std::sync::Arc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wv_client::{ClientConfig, WaveClient};

/// WASM entry point – called automatically when the module is instantiated.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    init().await
}

#[cfg(target_arch = "wasm32")]
async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let provider = provider::InjectedProvider::detect();
    if provider.is_some() {
        tracing::info!("we got the ethereum object");
    }
    let client = Rc::new(WaveClient::new(ClientConfig::default(), provider.map(Arc::new)));
    state::install(Rc::clone(&client), els.clone());
    render::render(&els, &client.view());

    events::bind_events(&els);

    client.mount().await;
    render::render(&els, &client.view());

    live::start(client, els);
    Ok(())
}
