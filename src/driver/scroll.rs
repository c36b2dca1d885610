use crate::driver::{DriverError, PageDriver, ScrollAction};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Issues page-advance actions and waits for lazy content to settle.
///
/// The only component that touches live page state. It knows nothing about
/// records; it only reports whether the content extent moved.
#[derive(Debug, Clone)]
pub struct ScrollDriver {
    settle: Duration,
    nudge_distance: i64,
    nudge_settle: Duration,
    last_extent: Option<u64>,
}

impl ScrollDriver {
    pub fn new(settle: Duration, nudge_distance: i64, nudge_settle: Duration) -> Self {
        Self {
            settle,
            nudge_distance,
            nudge_settle,
            last_extent: None,
        }
    }

    /// Record the current extent so the first `advance` has a baseline.
    pub async fn prime<D: PageDriver + ?Sized>(&mut self, page: &D) -> Result<(), DriverError> {
        self.last_extent = Some(page.content_extent().await?);
        Ok(())
    }

    /// Scroll to the bottom, wait the settle interval, and report whether the
    /// content extent changed since the previous measurement.
    pub async fn advance<D: PageDriver + ?Sized>(&mut self, page: &D) -> Result<bool, DriverError> {
        page.execute_scroll(ScrollAction::ToBottom).await?;
        sleep(self.settle).await;

        let extent = page.content_extent().await?;
        let changed = self.last_extent != Some(extent);
        debug!(extent, changed, "scroll settled");
        self.last_extent = Some(extent);
        Ok(changed)
    }

    /// Extra relative scroll used as a recovery attempt after an empty round.
    pub async fn nudge<D: PageDriver + ?Sized>(&mut self, page: &D) -> Result<(), DriverError> {
        page.execute_scroll(ScrollAction::By(self.nudge_distance)).await?;
        sleep(self.nudge_settle).await;
        Ok(())
    }
}
