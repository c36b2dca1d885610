use std::fs;

use crate::driver::Snapshot;
use crate::extractor::model::{NO_TEXT, UNKNOWN_TIMESTAMP, ZERO_COUNT};
use crate::extractor::{ExtractionMiss, extract};

fn timeline() -> Snapshot {
    let html = fs::read_to_string("src/extractor/tests/fixtures/timeline.html")
        .expect("Failed to read test fixture");
    Snapshot::new(html)
}

#[test]
fn test_extract_timeline_in_document_order() {
    let candidates = extract(&timeline());

    // The fourth article has no readable structure and is dropped
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].body.as_deref(), Ok("First post with a photo"));
    assert_eq!(candidates[1].body, Err(ExtractionMiss::Absent));
    assert_eq!(candidates[2].body.as_deref(), Ok("Two pictures"));
}

#[test]
fn test_extract_full_post() {
    let candidates = extract(&timeline());
    let first = &candidates[0];

    assert_eq!(first.timestamp.as_deref(), Ok("2024-05-01T10:00:00.000Z"));
    assert_eq!(first.engagement.replies.as_deref(), Ok("12"));
    assert_eq!(first.engagement.retweets.as_deref(), Ok("3"));
    assert_eq!(first.engagement.likes.as_deref(), Ok("1.2K"));
    // Avatar images are not attached media
    assert_eq!(
        first.media_refs,
        vec!["https://pbs.twimg.com/media/AAA111?format=jpg&name=large".to_string()]
    );
}

#[test]
fn test_missing_fields_are_distinguished() {
    let candidates = extract(&timeline());
    let second = &candidates[1];

    assert_eq!(second.engagement.replies, Err(ExtractionMiss::Empty));
    assert_eq!(second.engagement.retweets, Err(ExtractionMiss::Absent));
    assert_eq!(second.engagement.likes.as_deref(), Ok("7"));
    assert!(second.media_refs.is_empty());
}

#[test]
fn test_missing_fields_collapse_to_sentinels() {
    let candidates = extract(&timeline());
    let record = candidates[2].clone().into_record("someone", "fp".to_string());

    assert_eq!(record.timestamp, UNKNOWN_TIMESTAMP);
    assert_eq!(record.engagement.replies, ZERO_COUNT);
    assert_eq!(record.engagement.retweets, ZERO_COUNT);
    assert_eq!(record.engagement.likes, ZERO_COUNT);
    assert_eq!(record.media_refs.len(), 2);
    assert!(record.media_refs.iter().all(|url| url.ends_with("name=large")));

    let record = candidates[1].clone().into_record("someone", "fp".to_string());
    assert_eq!(record.body, NO_TEXT);
}

#[test]
fn test_count_reads_only_first_span() {
    let html = r#"<article data-testid="tweet"><div data-testid="tweetText">x</div>
        <button data-testid="reply"><span></span><span>Reply</span></button>
        <button data-testid="like"><span>5</span><span>Likes</span></button></article>"#;
    let candidates = extract(&Snapshot::new(html));

    assert_eq!(candidates[0].engagement.replies, Err(ExtractionMiss::Empty));
    assert_eq!(candidates[0].engagement.likes.as_deref(), Ok("5"));
}

#[test]
fn test_extract_is_deterministic() {
    let snapshot = timeline();
    assert_eq!(extract(&snapshot), extract(&snapshot));
}

#[test]
fn test_extract_empty_page() {
    assert!(extract(&Snapshot::new("<html><body></body></html>")).is_empty());
    assert!(extract(&Snapshot::new("")).is_empty());
}

#[test]
fn test_extract_garbled_markup() {
    let html = r#"<article data-testid="tweet"><div data-testid="tweetText">half open <b>bold"#;
    let candidates = extract(&Snapshot::new(html));

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].body.as_deref(), Ok("half open bold"));
    assert_eq!(candidates[0].timestamp, Err(ExtractionMiss::Absent));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract(&Snapshot::new(html));
        }

        #[test]
        fn test_extracted_fields_never_blank(body in "[a-zA-Z ]{0,40}", ts in "[0-9TZ:-]{0,24}") {
            let html = format!(
                r#"<article data-testid="tweet"><time datetime="{ts}"></time><div data-testid="tweetText">{body}</div></article>"#
            );
            for candidate in extract(&Snapshot::new(html)) {
                let record = candidate.into_record("someone", String::new());
                prop_assert!(!record.body.is_empty());
                prop_assert!(!record.timestamp.is_empty());
            }
        }
    }
}
