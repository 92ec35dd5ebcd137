//! WavePortal contract ABI.
//!
//! The contract surface is declared once with `sol!`; this crate turns the
//! generated call and event types into the plain `wv-api-types` structs the
//! rest of the workspace uses. `uint256` values are narrowed to `u64` and
//! anything wider is rejected.

use alloy_sol_types::sol;
use thiserror::Error;
use wv_api_types::{NewWaveEvent, RawWave, WalletAddress};

pub use alloy_primitives::{Address, B256, U256, hex};
pub use alloy_sol_types::{SolCall, SolEvent, SolValue};

sol! {
    struct Wave {
        address waver;
        string message;
        uint256 timestamp;
    }

    function getTotalWaveCount() external view returns (uint256);
    function getAllWaves() external view returns (Wave[] memory);
    function wave(string _message) external;

    event NewWave(address indexed from, uint256 timestamp, string message);
}

#[derive(Debug, Error)]
pub enum AbiError {
    #[error(transparent)]
    Codec(#[from] alloy_sol_types::Error),
    #[error("{0} does not fit in 64 bits")]
    Overflow(&'static str),
    #[error("invalid hex {input}: {reason}")]
    InvalidHex { input: String, reason: String },
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, AbiError>;

pub fn to_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_prefixed(bytes)
}

/// Decodes hex with or without a `0x` prefix.
pub fn from_hex(input: &str) -> Result<Vec<u8>> {
    hex::decode(input).map_err(|err| AbiError::InvalidHex {
        input: input.to_owned(),
        reason: err.to_string(),
    })
}

pub fn parse_address(input: &str) -> Result<Address> {
    input
        .parse()
        .map_err(|_| AbiError::InvalidAddress(input.to_owned()))
}

/// Lowercase `0x`-prefixed form.
pub fn format_address(address: &Address) -> WalletAddress {
    WalletAddress(to_hex_prefixed(address))
}

fn narrow(value: U256, what: &'static str) -> Result<u64> {
    u64::try_from(value).map_err(|_| AbiError::Overflow(what))
}

pub fn encode_total_count_call() -> Vec<u8> {
    getTotalWaveCountCall {}.abi_encode()
}

pub fn encode_all_waves_call() -> Vec<u8> {
    getAllWavesCall {}.abi_encode()
}

/// Calldata for `wave(message)`. The message is encoded as given.
pub fn encode_wave_call(message: &str) -> Vec<u8> {
    waveCall {
        _message: message.to_owned(),
    }
    .abi_encode()
}

/// `topics[0]` of every `NewWave` log.
pub fn new_wave_topic() -> B256 {
    NewWave::SIGNATURE_HASH
}

/// Decodes the return data of `getTotalWaveCount()`.
pub fn decode_total_count(data: &[u8]) -> Result<u64> {
    narrow(U256::abi_decode(data)?, "wave count")
}

/// Decodes the return data of `getAllWaves()` preserving contract order.
pub fn decode_all_waves(data: &[u8]) -> Result<Vec<RawWave>> {
    Vec::<Wave>::abi_decode(data)?
        .into_iter()
        .map(|wave| {
            Ok(RawWave {
                waver: format_address(&wave.waver),
                message: wave.message,
                timestamp: narrow(wave.timestamp, "wave timestamp")?,
            })
        })
        .collect()
}

/// Decodes a `NewWave` log from its hex topics and raw data. Chain position
/// fields are left empty for the caller to fill in.
pub fn decode_new_wave(topics: &[String], data: &[u8]) -> Result<NewWaveEvent> {
    let topics = topics
        .iter()
        .map(|topic| {
            topic.parse::<B256>().map_err(|err| AbiError::InvalidHex {
                input: topic.clone(),
                reason: err.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let event = NewWave::decode_raw_log(topics, data)?;

    Ok(NewWaveEvent {
        from: format_address(&event.from),
        timestamp: narrow(event.timestamp, "event timestamp")?,
        message: event.message,
        tx_hash: None,
        block_number: None,
        log_index: None,
    })
}
