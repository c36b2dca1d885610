pub mod client;
pub mod errors;
pub mod rewrite;
pub mod storage;

pub use client::fetch_bytes;
pub use errors::{FetchError, StorageError};
pub use rewrite::{media_extension, upgrade_media_url};
pub use storage::{FsMediaStore, MediaStore, MemoryMediaStore};

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Identity of the record whose media is being fetched.
#[derive(Debug, Clone, Copy)]
pub struct MediaContext<'a> {
    pub owner: &'a str,
    /// 1-based position the record takes in the session output.
    pub record_ordinal: usize,
}

/// Stable, collision-free name for the `media_ordinal`-th (1-based) item of a record.
pub fn artifact_name(context: MediaContext<'_>, media_ordinal: usize, url: &str) -> String {
    format!(
        "{}_tweet{}_img{}.{}",
        context.owner,
        context.record_ordinal,
        media_ordinal,
        media_extension(url)
    )
}

/// Downloads a record's media into a [`MediaStore`], one item at a time.
#[derive(Clone)]
pub struct MediaFetcher {
    store: Arc<dyn MediaStore>,
    timeout: Duration,
}

impl MediaFetcher {
    pub fn new(store: Arc<dyn MediaStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fetch and persist every URL in order. Failed items are logged and left
    /// out of the result; they never affect their siblings.
    #[instrument(skip_all, fields(owner = context.owner, record = context.record_ordinal, count = urls.len()))]
    pub async fn fetch(&self, urls: &[String], context: MediaContext<'_>) -> Vec<String> {
        let mut stored = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            let name = artifact_name(context, index + 1, url);
            match self.fetch_one(url, &name).await {
                Ok(()) => {
                    debug!("Stored {}", name);
                    stored.push(name);
                }
                Err(e) => warn!("Skipping media {} ({}): {}", index + 1, url, e),
            }
        }

        stored
    }

    async fn fetch_one(&self, url: &str, name: &str) -> Result<(), FetchError> {
        let bytes = fetch_bytes(&upgrade_media_url(url), self.timeout).await?;
        self.store.put(name, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_layout() {
        let context = MediaContext {
            owner: "someone",
            record_ordinal: 4,
        };

        assert_eq!(
            artifact_name(context, 2, "https://pbs.twimg.com/media/A?format=png&name=large"),
            "someone_tweet4_img2.png"
        );
        assert_eq!(
            artifact_name(context, 1, "https://pbs.twimg.com/media/A"),
            "someone_tweet4_img1.jpg"
        );
    }

    #[tokio::test]
    async fn test_invalid_urls_are_skipped() {
        let store = Arc::new(MemoryMediaStore::new());
        let fetcher = MediaFetcher::new(store.clone(), Duration::from_millis(200));
        let context = MediaContext {
            owner: "someone",
            record_ordinal: 1,
        };

        let stored = fetcher
            .fetch(&["not a url".to_string(), "::".to_string()], context)
            .await;

        assert!(stored.is_empty());
        assert!(store.names().is_empty());
    }
}
