pub mod replay;
pub mod scroll;

pub use replay::ReplayDriver;
pub use scroll::ScrollDriver;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("page unreachable: {0}")]
    Unreachable(String),

    #[error("page action failed: {0}")]
    Action(String),

    #[error("snapshot unavailable: {0}")]
    Snapshot(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The DOM state visible at one point of the run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub html: String,
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            captured_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    /// Jump to the bottom of the document, the "load more" trigger.
    ToBottom,
    /// Relative scroll by a number of pixels.
    By(i64),
}

/// Narrow capability set the harvester needs from a live or recorded page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to the feed of `target`.
    async fn open(&self, target: &str) -> Result<(), DriverError>;

    async fn current_snapshot(&self) -> Result<Snapshot, DriverError>;

    async fn execute_scroll(&self, action: ScrollAction) -> Result<(), DriverError>;

    /// Measured extent of the rendered content (scroll height).
    async fn content_extent(&self) -> Result<u64, DriverError>;
}
