use crate::dedup::Deduplicator;
use crate::extractor::Record;
use crate::harvest::report::{HarvestReport, StopReason};

/// Mutable state of one run. Owned by the harvester alone.
#[derive(Debug)]
pub struct SessionState {
    pub collected: Vec<Record>,
    pub dedup: Deduplicator,
    pub rounds: u32,
    pub scroll_attempts: u32,
    pub stagnant_rounds: u32,
}

impl SessionState {
    pub fn new(fingerprint_width: usize) -> Self {
        Self {
            collected: Vec::new(),
            dedup: Deduplicator::new(fingerprint_width),
            rounds: 0,
            scroll_attempts: 0,
            stagnant_rounds: 0,
        }
    }

    pub fn is_full(&self, max_records: usize) -> bool {
        self.collected.len() >= max_records
    }

    /// Update the stagnation counter after a round. Returns the new value.
    pub fn record_round(&mut self, novel: usize) -> u32 {
        if novel == 0 {
            self.stagnant_rounds += 1;
        } else {
            self.stagnant_rounds = 0;
        }
        self.stagnant_rounds
    }

    pub fn into_report(self, owner: &str, stop_reason: Option<StopReason>) -> HarvestReport {
        HarvestReport {
            owner: owner.to_string(),
            records: self.collected,
            rounds: self.rounds,
            scroll_attempts: self.scroll_attempts,
            stagnant_rounds: self.stagnant_rounds,
            stop_reason,
        }
    }
}
