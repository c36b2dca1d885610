use crate::driver::DriverError;
use crate::extractor::Record;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `max_records` accepted.
    TargetReached,
    /// `stagnation_limit` consecutive rounds without a novel record.
    Stagnated,
    /// `max_scrolls` scroll rounds issued.
    ScrollCeiling,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            StopReason::TargetReached => "target reached",
            StopReason::Stagnated => "no new records",
            StopReason::ScrollCeiling => "scroll ceiling reached",
        };
        f.write_str(reason)
    }
}

/// Outcome of a run, handed to the output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub owner: String,
    pub records: Vec<Record>,
    pub rounds: u32,
    pub scroll_attempts: u32,
    pub stagnant_rounds: u32,
    /// `None` only on partial reports attached to a failure.
    pub stop_reason: Option<StopReason>,
}

impl HarvestReport {
    pub fn records_with_media(&self) -> usize {
        self.records
            .iter()
            .filter(|record| !record.media_refs.is_empty())
            .count()
    }
}

#[derive(Error, Debug)]
pub enum HarvestError {
    /// The page never became usable; nothing was collected.
    #[error("page setup failed: {0}")]
    Setup(#[source] DriverError),

    /// The driver failed mid-run; `partial` holds what was collected so far.
    #[error("driver failed after {} records: {source}", .partial.records.len())]
    Driver {
        #[source]
        source: DriverError,
        partial: Box<HarvestReport>,
    },
}

impl HarvestError {
    pub fn partial(&self) -> Option<&HarvestReport> {
        match self {
            HarvestError::Setup(_) => None,
            HarvestError::Driver { partial, .. } => Some(partial),
        }
    }
}
