//! Wave Station client core.
//!
//! `WaveClient` drives a WavePortal contract through an injected wallet
//! provider and keeps the display state (account, count, waves, loading)
//! that front ends render through [`WaveView`].

pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_support;

pub use client::{PendingWave, WaveClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use feed::WaveFeed;
pub use state::{LoadingGuard, WaveState};
pub use view::{Controls, WaveView};
