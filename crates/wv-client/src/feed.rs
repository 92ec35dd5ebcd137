//! Ordered list of waves as displayed.
//!
//! A live `NewWave` log may describe a wave the last bulk fetch already
//! returned (our own wave, mined and refreshed before the filter was polled).
//! Each stored copy can absorb exactly one such log; every other log is a
//! new wave, even when its content matches one already shown.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use wv_api_types::{LogId, WaveKey, WaveRecord};

#[derive(Debug, Clone, Default)]
pub struct WaveFeed {
    records: Vec<WaveRecord>,
    /// Copies per key in the last bulk fetch that no live log has matched.
    unclaimed: HashMap<WaveKey, usize>,
    /// Logs already handled, with the wave each one described.
    seen_logs: HashMap<LogId, WaveKey>,
}

impl WaveFeed {
    /// Replaces the whole feed with a bulk fetch given in contract storage
    /// order; the feed shows it newest first. Identical waves stored twice
    /// on-chain are kept as-is.
    pub fn replace_from_storage_order(&mut self, mut storage_order: Vec<WaveRecord>) {
        storage_order.reverse();

        let mut unclaimed: HashMap<WaveKey, usize> = HashMap::new();
        for record in &storage_order {
            *unclaimed.entry(record.key()).or_default() += 1;
        }
        // Logs seen before this fetch are already part of it once mined.
        for key in self.seen_logs.values() {
            if let Some(copies) = unclaimed.get_mut(key) {
                *copies = copies.saturating_sub(1);
            }
        }

        self.unclaimed = unclaimed;
        self.records = storage_order;
    }

    /// Appends a live record at the end. Returns false when `log` was handled
    /// before or the record matches an unclaimed copy from the bulk fetch.
    pub fn append(&mut self, record: WaveRecord, log: Option<LogId>) -> bool {
        let key = record.key();
        if let Some(log) = log {
            match self.seen_logs.entry(log) {
                Entry::Occupied(_) => return false,
                Entry::Vacant(slot) => {
                    slot.insert(key.clone());
                }
            }
        }

        if let Some(copies) = self.unclaimed.get_mut(&key) {
            if *copies > 0 {
                *copies -= 1;
                return false;
            }
        }

        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[WaveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
