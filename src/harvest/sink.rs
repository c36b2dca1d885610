use crate::harvest::report::HarvestReport;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

/// Consumer of a finished (or partial) run.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist the report, returning where it went.
    async fn write(&self, report: &HarvestReport) -> anyhow::Result<PathBuf>;
}

/// Writes the report as pretty JSON into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<owner>_<n>records_<YYYYmmdd_HHMMSS>.json`
    pub fn file_name(report: &HarvestReport, at: DateTime<Local>) -> String {
        format!(
            "{}_{}records_{}.json",
            report.owner,
            report.records.len(),
            at.format("%Y%m%d_%H%M%S")
        )
    }
}

#[async_trait]
impl RecordSink for JsonFileSink {
    async fn write(&self, report: &HarvestReport) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(report, Local::now()));
        let json = serde_json::to_vec_pretty(report)?;
        tokio::fs::write(&path, json).await?;

        info!("Saved {} records to {}", report.records.len(), path.display());
        Ok(path)
    }
}
