//! DOM element bindings.
//!
//! All fields are resolved once at startup from the ids in `index.html`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Window};

// ── Helpers ──

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn doc() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Result<T, JsValue> {
    doc()?
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<T>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    doc()?.create_element(tag)
}

pub fn set_visible(el: &HtmlElement, visible: bool) {
    let _ = el
        .style()
        .set_property("display", if visible { "" } else { "none" });
}

/// Raw input value; messages are sent exactly as typed.
pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value()
}

pub fn alert(message: &str) {
    if let Ok(window) = window() {
        let _ = window.alert_with_message(message);
    }
}

// ── Element registry ──

#[derive(Clone)]
pub struct Elements {
    pub connect_btn: HtmlElement,
    pub wave_btn: HtmlElement,
    pub message_input: HtmlInputElement,
    pub loading: HtmlElement,
    pub banner: HtmlElement,
    pub waves: HtmlElement,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            connect_btn: by_id_typed("connectWallet")?,
            wave_btn: by_id_typed("waveButton")?,
            message_input: by_id_typed("messageInput")?,
            loading: by_id_typed("loading")?,
            banner: by_id_typed("waveCount")?,
            waves: by_id_typed("waves")?,
        })
    }
}
