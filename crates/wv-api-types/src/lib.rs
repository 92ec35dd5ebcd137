use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Lowercased form used for comparisons; wallets and nodes disagree on checksum casing.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an installed log filter on the provider side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterId(pub String);

/// A wave exactly as the contract stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawWave {
    pub waver: WalletAddress,
    pub message: String,
    pub timestamp: u64,
}

/// Decoded `NewWave` log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWaveEvent {
    pub from: WalletAddress,
    pub timestamp: u64,
    pub message: String,
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub log_index: Option<u64>,
}

impl NewWaveEvent {
    /// Where the log sits on chain, when the provider reported it.
    pub fn log_id(&self) -> Option<LogId> {
        Some(LogId {
            tx_hash: self.tx_hash.clone()?,
            log_index: self.log_index?,
        })
    }
}

/// Identity of a single emitted log. Two waves with identical content are
/// still two logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LogId {
    pub tx_hash: TxHash,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampOutOfRange(pub u64);

impl fmt::Display for TimestampOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timestamp {} is outside the representable range", self.0)
    }
}

impl std::error::Error for TimestampOutOfRange {}

/// Display model for a single wave.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaveRecord {
    pub address: WalletAddress,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl WaveRecord {
    pub fn from_unix_seconds(
        address: WalletAddress,
        seconds: u64,
        message: String,
    ) -> Result<Self, TimestampOutOfRange> {
        let secs = i64::try_from(seconds).map_err(|_| TimestampOutOfRange(seconds))?;
        let timestamp = DateTime::<Utc>::from_timestamp(secs, 0).ok_or(TimestampOutOfRange(seconds))?;
        Ok(Self {
            address,
            timestamp,
            message,
        })
    }

    pub fn key(&self) -> WaveKey {
        WaveKey {
            address: self.address.normalized(),
            timestamp: self.timestamp.timestamp(),
            message: self.message.clone(),
        }
    }

    /// Human readable time, e.g. `Tue Nov 14 2023 22:13:20 UTC`.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%a %b %d %Y %H:%M:%S UTC").to_string()
    }
}

impl TryFrom<RawWave> for WaveRecord {
    type Error = TimestampOutOfRange;

    fn try_from(raw: RawWave) -> Result<Self, Self::Error> {
        Self::from_unix_seconds(raw.waver, raw.timestamp, raw.message)
    }
}

impl TryFrom<NewWaveEvent> for WaveRecord {
    type Error = TimestampOutOfRange;

    fn try_from(event: NewWaveEvent) -> Result<Self, Self::Error> {
        Self::from_unix_seconds(event.from, event.timestamp, event.message)
    }
}

/// Stable identity of a wave: the same logical wave seen via the bulk fetch
/// and via a live event yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaveKey {
    pub address: String,
    pub timestamp: i64,
    pub message: String,
}
