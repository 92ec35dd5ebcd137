//! Renders a [`WaveView`] into the page.

use wasm_bindgen::JsValue;
use wv_api_types::WaveRecord;
use wv_client::{Controls, WaveView};

use crate::dom::{self, Elements};

pub fn render(els: &Elements, view: &WaveView) {
    let composing = view.controls == Controls::Compose;
    dom::set_visible(&els.connect_btn, !composing);
    dom::set_visible(&els.message_input, composing);
    dom::set_visible(&els.wave_btn, composing);
    dom::set_visible(&els.loading, view.loading);

    match &view.banner {
        Some(text) => {
            els.banner.set_text_content(Some(text));
            dom::set_visible(&els.banner, true);
        }
        None => dom::set_visible(&els.banner, false),
    }

    els.waves.set_text_content(None);
    for wave in &view.waves {
        if let Err(err) = append_wave(els, wave) {
            tracing::warn!("failed to render wave: {err:?}");
        }
    }
}

fn append_wave(els: &Elements, wave: &WaveRecord) -> Result<(), JsValue> {
    let card = dom::create_element("div")?;
    card.set_class_name("messages");

    let rows = [
        ("Address", wave.address.to_string()),
        ("Time", wave.display_time()),
        ("Message", wave.message.clone()),
    ];
    for (label, value) in rows {
        let row = dom::create_element("div")?;
        row.set_class_name("message");
        let strong = dom::create_element("strong")?;
        strong.set_text_content(Some(&format!("{label}:")));
        // Text content only: messages are arbitrary user input.
        let text = dom::create_element("span")?;
        text.set_text_content(Some(&format!(" {value}")));
        row.append_child(&strong)?;
        row.append_child(&text)?;
        card.append_child(&row)?;
    }

    els.waves.append_child(&card)?;
    Ok(())
}
