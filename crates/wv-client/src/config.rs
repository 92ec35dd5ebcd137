use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x38cFfadC426cE9c7255FB0282C1EBf37cf12e66C";
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Client settings. `from_env` reads `WAVE_CONTRACT_ADDRESS`,
/// `WAVE_GAS_LIMIT` and `WAVE_POLL_INTERVAL_MS`; anything unset or
/// unparsable falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub contract_address: String,
    /// Gas ceiling attached to every `wave` transaction.
    pub gas_limit: u64,
    /// Cadence for receipt and event-filter polling.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_owned(),
            gas_limit: DEFAULT_GAS_LIMIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let contract_address = lookup("WAVE_CONTRACT_ADDRESS")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.contract_address);

        let gas_limit = parse_or("WAVE_GAS_LIMIT", lookup("WAVE_GAS_LIMIT"), defaults.gas_limit);

        let poll_interval = lookup("WAVE_POLL_INTERVAL_MS")
            .map(|raw| parse_or("WAVE_POLL_INTERVAL_MS", Some(raw), 0))
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        Self {
            contract_address,
            gas_limit,
            poll_interval,
        }
    }

    pub fn with_contract_address(mut self, address: impl Into<String>) -> Self {
        self.contract_address = address.into();
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

fn parse_or(key: &str, raw: Option<String>, fallback: u64) -> u64 {
    match raw {
        None => fallback,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring non-numeric {key}='{value}'");
            fallback
        }),
    }
}
