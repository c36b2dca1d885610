use crate::driver::{DriverError, PageDriver, ScrollAction, Snapshot};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, instrument};

/// Replays a fixed sequence of recorded page snapshots.
///
/// Every bottom scroll moves to the next snapshot, clamped at the last one.
/// Relative scrolls leave the cursor untouched. The content extent is the
/// byte length of the current snapshot.
#[derive(Debug)]
pub struct ReplayDriver {
    snapshots: Vec<String>,
    cursor: AtomicUsize,
}

impl ReplayDriver {
    pub fn new<I, S>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            snapshots: snapshots.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Load every `*.html` file in `dir`, ordered by file name.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn from_dir(dir: impl AsRef<Path>) -> Result<Self, DriverError> {
        let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "html") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut snapshots = Vec::with_capacity(paths.len());
        for path in &paths {
            let bytes = tokio::fs::read(path).await?;
            snapshots.push(String::from_utf8_lossy(&bytes).into_owned());
        }

        info!("Loaded {} recorded snapshots", snapshots.len());
        Ok(Self::new(snapshots))
    }

    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    fn current(&self) -> Result<&str, DriverError> {
        self.snapshots
            .get(self.position())
            .map(String::as_str)
            .ok_or_else(|| DriverError::Snapshot("no recorded snapshots".to_string()))
    }
}

#[async_trait]
impl PageDriver for ReplayDriver {
    async fn open(&self, target: &str) -> Result<(), DriverError> {
        if self.snapshots.is_empty() {
            return Err(DriverError::Unreachable(format!(
                "no recorded snapshots for {target}"
            )));
        }
        self.cursor.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn current_snapshot(&self) -> Result<Snapshot, DriverError> {
        self.current().map(Snapshot::new)
    }

    async fn execute_scroll(&self, action: ScrollAction) -> Result<(), DriverError> {
        if let ScrollAction::ToBottom = action {
            let last = self.snapshots.len().saturating_sub(1);
            let next = (self.position() + 1).min(last);
            self.cursor.store(next, Ordering::SeqCst);
            debug!(position = next, "replay advanced");
        }
        Ok(())
    }

    async fn content_extent(&self) -> Result<u64, DriverError> {
        Ok(self.current()?.len() as u64)
    }
}
