use wv_api_types::WaveRecord;

use crate::state::WaveState;

/// Which controls the page shows. Exactly one variant is rendered, so the
/// connect button and the compose controls can never appear together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    ConnectWallet,
    /// Message input plus the "Wave at Me" button.
    Compose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveView {
    pub controls: Controls,
    pub loading: bool,
    pub banner: Option<String>,
    pub waves: Vec<WaveRecord>,
}

impl From<&WaveState> for WaveView {
    fn from(state: &WaveState) -> Self {
        let connected = state.account.is_some();
        let banner = match state.total_waves {
            Some(total) if connected && !state.feed.is_empty() => {
                Some(format!("{total} people have waved"))
            }
            _ => None,
        };

        Self {
            controls: if connected {
                Controls::Compose
            } else {
                Controls::ConnectWallet
            },
            loading: state.loading(),
            banner,
            waves: state.feed.records().to_vec(),
        }
    }
}
