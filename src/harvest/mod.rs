pub mod report;
pub mod session;
pub mod sink;

pub use report::{HarvestError, HarvestReport, StopReason};
pub use session::SessionState;
pub use sink::{JsonFileSink, RecordSink};

use crate::config::HarvestConfig;
use crate::driver::{DriverError, PageDriver, ScrollAction, ScrollDriver};
use crate::extractor::extract;
use crate::fetcher::{MediaContext, MediaFetcher};
use tokio::time::sleep;
use tracing::{debug, info, instrument};

const PROGRESS_EVERY: usize = 10;

/// Drives the round loop: snapshot, extract, dedupe, fetch media, scroll,
/// and decide whether to stop.
pub struct Harvester<D> {
    config: HarvestConfig,
    driver: D,
    media: Option<MediaFetcher>,
}

impl<D: PageDriver> Harvester<D> {
    pub fn new(config: HarvestConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            media: None,
        }
    }

    /// Download media of accepted records through `fetcher`.
    ///
    /// Ignored unless `download_media` is set in the configuration.
    pub fn with_media(mut self, fetcher: MediaFetcher) -> Self {
        self.media = Some(fetcher);
        self
    }

    /// Run until the target count, stagnation or the scroll ceiling.
    ///
    /// A driver failure after setup still hands back everything collected so
    /// far through [`HarvestError::Driver`].
    #[instrument(skip(self), fields(target = %self.config.target))]
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let mut scroll = ScrollDriver::new(
            self.config.settle,
            self.config.nudge_distance,
            self.config.nudge_settle,
        );
        self.setup(&mut scroll).await.map_err(HarvestError::Setup)?;

        let mut session = SessionState::new(self.config.fingerprint_width);
        loop {
            match self.round(&mut session, &mut scroll).await {
                Ok(None) => continue,
                Ok(Some(reason)) => {
                    let report = session.into_report(&self.config.target, Some(reason));
                    info!(
                        "Stopping: {} ({} records, {} with media, {} rounds, {} scrolls)",
                        reason,
                        report.records.len(),
                        report.records_with_media(),
                        report.rounds,
                        report.scroll_attempts
                    );
                    return Ok(report);
                }
                Err(source) => {
                    let partial = session.into_report(&self.config.target, None);
                    return Err(HarvestError::Driver {
                        source,
                        partial: Box::new(partial),
                    });
                }
            }
        }
    }

    async fn setup(&self, scroll: &mut ScrollDriver) -> Result<(), DriverError> {
        self.driver.open(&self.config.target).await?;
        info!("Opened feed of {}", self.config.target);
        sleep(self.config.initial_wait).await;

        for _ in 0..self.config.warmup_scrolls {
            self.driver
                .execute_scroll(ScrollAction::By(self.config.warmup_distance))
                .await?;
            sleep(self.config.warmup_settle).await;
        }

        scroll.prime(&self.driver).await
    }

    /// One round. Returns the stop reason once the run is over.
    async fn round(
        &self,
        session: &mut SessionState,
        scroll: &mut ScrollDriver,
    ) -> Result<Option<StopReason>, DriverError> {
        session.rounds += 1;

        let snapshot = self.driver.current_snapshot().await?;
        let candidates = extract(&snapshot);
        let seen = candidates.len();

        let mut novel = 0;
        for candidate in candidates {
            if session.is_full(self.config.max_records) {
                break;
            }
            let Some(fingerprint) = session.dedup.accept(&candidate) else {
                continue;
            };

            let record_ordinal = session.collected.len() + 1;
            let mut record = candidate.into_record(&self.config.target, fingerprint);
            if let Some(media) = self.media_fetcher()
                && !record.media_refs.is_empty()
            {
                let context = MediaContext {
                    owner: &self.config.target,
                    record_ordinal,
                };
                record.downloaded_media = media.fetch(&record.media_refs, context).await;
            }

            session.collected.push(record);
            novel += 1;
            if session.collected.len() % PROGRESS_EVERY == 0 {
                info!("Harvested {} records...", session.collected.len());
            }
        }

        if session.is_full(self.config.max_records) {
            return Ok(Some(StopReason::TargetReached));
        }

        let grew = scroll.advance(&self.driver).await?;
        session.scroll_attempts += 1;
        let stagnant = session.record_round(novel);
        debug!(
            round = session.rounds,
            seen,
            novel,
            grew,
            stagnant,
            scrolls = session.scroll_attempts,
            "round finished"
        );

        if novel == 0 {
            if stagnant >= self.config.stagnation_limit {
                return Ok(Some(StopReason::Stagnated));
            }
            scroll.nudge(&self.driver).await?;
        }

        if session.scroll_attempts >= self.config.max_scrolls {
            return Ok(Some(StopReason::ScrollCeiling));
        }

        Ok(None)
    }

    fn media_fetcher(&self) -> Option<&MediaFetcher> {
        self.media.as_ref().filter(|_| self.config.download_media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockPageDriver, ReplayDriver, Snapshot};
    use std::sync::{Arc, Mutex};

    fn post(body: &str, ts: &str) -> String {
        format!(
            r#"<article data-testid="tweet"><time datetime="{ts}"></time><div data-testid="tweetText">{body}</div></article>"#
        )
    }

    fn config(max_records: usize, stagnation_limit: u32, max_scrolls: u32) -> HarvestConfig {
        let mut config = HarvestConfig::new("someone").without_waits();
        config.max_records = max_records;
        config.stagnation_limit = stagnation_limit;
        config.max_scrolls = max_scrolls;
        config.download_media = false;
        config
    }

    #[tokio::test]
    async fn test_identical_snapshots_stagnate() {
        let page = format!("{}{}", post("hello", "t1"), post("world", "t2"));
        let driver = ReplayDriver::new([page.clone(), page.clone(), page]);

        let report = Harvester::new(config(5, 2, 40), driver).run().await.unwrap();

        let bodies: Vec<&str> = report.records.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, vec!["hello", "world"]);
        assert_eq!(report.rounds, 3);
        assert_eq!(report.stagnant_rounds, 2);
        assert_eq!(report.stop_reason, Some(StopReason::Stagnated));
    }

    #[tokio::test]
    async fn test_target_stops_mid_snapshot() {
        let page = (1..=6).map(|i| post(&format!("post {i}"), "t")).collect::<String>();
        let driver = ReplayDriver::new([page]);

        let report = Harvester::new(config(4, 5, 40), driver).run().await.unwrap();

        assert_eq!(report.records.len(), 4);
        assert_eq!(report.records[3].body, "post 4");
        assert_eq!(report.rounds, 1);
        assert_eq!(report.scroll_attempts, 0);
        assert_eq!(report.stop_reason, Some(StopReason::TargetReached));
    }

    #[tokio::test]
    async fn test_scroll_ceiling_bounds_endless_feed() {
        let pages: Vec<String> = (0..20).map(|i| post(&format!("post {i}"), "t")).collect();
        let driver = ReplayDriver::new(pages);

        let report = Harvester::new(config(100, 5, 7), driver).run().await.unwrap();

        assert_eq!(report.scroll_attempts, 7);
        assert_eq!(report.rounds, 7);
        assert_eq!(report.records.len(), 7);
        assert_eq!(report.stop_reason, Some(StopReason::ScrollCeiling));
    }

    #[tokio::test]
    async fn test_setup_failure_has_no_records() {
        let mut driver = MockPageDriver::new();
        driver
            .expect_open()
            .returning(|_| Err(DriverError::Unreachable("timed out".into())));

        let result = Harvester::new(config(5, 2, 40), driver).run().await;

        match result {
            Err(err @ HarvestError::Setup(_)) => assert!(err.partial().is_none()),
            other => panic!("Expected setup failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mid_run_failure_keeps_partial_records() {
        let mut driver = MockPageDriver::new();
        driver.expect_open().returning(|_| Ok(()));
        driver.expect_execute_scroll().returning(|_| Ok(()));
        driver.expect_content_extent().returning(|| Ok(10));

        let mut calls = 0;
        driver.expect_current_snapshot().returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(Snapshot::new(post("kept", "t1")))
            } else {
                Err(DriverError::Snapshot("tab crashed".into()))
            }
        });

        let result = Harvester::new(config(5, 3, 40), driver).run().await;

        match result {
            Err(HarvestError::Driver { partial, .. }) => {
                assert_eq!(partial.records.len(), 1);
                assert_eq!(partial.records[0].body, "kept");
                assert_eq!(partial.stop_reason, None);
            }
            other => panic!("Expected driver failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_warmup_then_nudge_only_after_empty_rounds() {
        let actions = Arc::new(Mutex::new(Vec::new()));
        let mut driver = MockPageDriver::new();
        driver.expect_open().times(1).returning(|_| Ok(()));
        driver.expect_content_extent().returning(|| Ok(10));
        driver
            .expect_current_snapshot()
            .returning(|| Ok(Snapshot::new(post("same", "t1"))));
        let recorded = actions.clone();
        driver.expect_execute_scroll().returning(move |action| {
            recorded.lock().unwrap().push(action);
            Ok(())
        });

        let mut config = config(5, 3, 40);
        config.warmup_scrolls = 3;
        config.warmup_distance = 500;
        config.nudge_distance = 1000;
        let report = Harvester::new(config, driver).run().await.unwrap();

        use ScrollAction::{By, ToBottom};
        assert_eq!(
            *actions.lock().unwrap(),
            vec![By(500), By(500), By(500), ToBottom, ToBottom, By(1000), ToBottom, By(1000), ToBottom]
        );
        assert_eq!(report.rounds, 4);
        assert_eq!(report.scroll_attempts, 4);
        assert_eq!(report.stop_reason, Some(StopReason::Stagnated));
    }

    #[tokio::test]
    async fn test_media_disabled_leaves_downloads_empty() {
        let page = r#"<article data-testid="tweet"><div data-testid="tweetText">pic</div><img src="https://pbs.twimg.com/media/A?format=jpg&amp;name=small"></article>"#;
        let driver = ReplayDriver::new([page]);
        let store = std::sync::Arc::new(crate::fetcher::MemoryMediaStore::new());
        let fetcher = MediaFetcher::new(store.clone(), std::time::Duration::from_millis(50));

        let report = Harvester::new(config(1, 2, 40), driver)
            .with_media(fetcher)
            .run()
            .await
            .unwrap();

        assert_eq!(report.records[0].media_refs.len(), 1);
        assert!(report.records[0].downloaded_media.is_empty());
        assert!(store.names().is_empty());
    }
}
