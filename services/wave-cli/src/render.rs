use std::fmt::Write as _;
use wv_api_types::WaveRecord;
use wv_client::{Controls, WaveView};

pub(crate) fn wave_block(wave: &WaveRecord) -> String {
    format!(
        "Address: {}\nTime:    {}\nMessage: {}\n",
        wave.address,
        wave.display_time(),
        wave.message
    )
}

/// Plain-text rendering of the page.
pub(crate) fn render(view: &WaveView) -> String {
    let mut out = String::new();

    match view.controls {
        Controls::ConnectWallet => out.push_str("[ Connect Wallet ]\n"),
        Controls::Compose => out.push_str("[ message ] [ Wave at Me ]\n"),
    }
    if view.loading {
        out.push_str("mining...\n");
    }
    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "{banner}");
    }
    for wave in &view.waves {
        out.push('\n');
        out.push_str(&wave_block(wave));
    }
    out
}
