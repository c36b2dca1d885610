use anyhow::Result;
use feedharvest::{
    config::HarvestConfig,
    driver::ReplayDriver,
    fetcher::{FsMediaStore, MediaFetcher},
    harvest::{HarvestError, Harvester, JsonFileSink, RecordSink},
};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = HarvestConfig::from_env()?;
    info!(
        "Harvesting @{} - max_records: {}, max_scrolls: {}, settle: {:?}, stagnation_limit: {}, media: {}",
        config.target,
        config.max_records,
        config.max_scrolls,
        config.settle,
        config.stagnation_limit,
        config.download_media
    );

    let driver = ReplayDriver::from_dir(&config.snapshot_dir).await?;
    let sink = JsonFileSink::new(&config.output_dir);

    let mut harvester = Harvester::new(config.clone(), driver);
    if config.download_media {
        info!("Media will be saved to {}", config.media_dir.display());
        let store = Arc::new(FsMediaStore::new(&config.media_dir));
        harvester = harvester.with_media(MediaFetcher::new(store, config.media_timeout));
    }

    let run_id = Uuid::new_v4();
    let result = harvester
        .run()
        .instrument(info_span!("harvest", run_id = %run_id))
        .await;

    match result {
        Ok(report) => {
            sink.write(&report).await?;
            for (idx, record) in report.records.iter().take(3).enumerate() {
                let preview: String = record.body.chars().take(100).collect();
                info!(
                    "#{} [{}] {} ({} likes, {} retweets, {} media)",
                    idx + 1,
                    record.timestamp,
                    preview,
                    record.engagement.likes,
                    record.engagement.retweets,
                    record.media_refs.len()
                );
            }
            Ok(())
        }
        Err(err) => {
            error!("Harvest failed: {}", err);
            if let HarvestError::Driver { partial, .. } = &err
                && !partial.records.is_empty()
            {
                sink.write(partial).await?;
            }
            Err(err.into())
        }
    }
}
