//! Display state shared between the client and its in-flight writes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wv_api_types::WalletAddress;

use crate::feed::WaveFeed;

#[derive(Debug, Clone, Default)]
pub struct WaveState {
    pub account: Option<WalletAddress>,
    pub total_waves: Option<u64>,
    pub feed: WaveFeed,
    pending_writes: usize,
}

impl WaveState {
    /// True while at least one submitted wave is awaiting confirmation.
    pub fn loading(&self) -> bool {
        self.pending_writes > 0
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Arc<Mutex<WaveState>>);

impl SharedState {
    pub(crate) fn lock(&self) -> MutexGuard<'_, WaveState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> WaveState {
        self.lock().clone()
    }
}

/// Holds the loading indicator on for as long as it lives.
#[derive(Debug)]
pub struct LoadingGuard {
    state: SharedState,
}

impl LoadingGuard {
    pub(crate) fn acquire(state: &SharedState) -> Self {
        state.lock().pending_writes += 1;
        Self {
            state: state.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.pending_writes = state.pending_writes.saturating_sub(1);
    }
}
