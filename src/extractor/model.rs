use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const UNKNOWN_TIMESTAMP: &str = "Unknown";
pub const NO_TEXT: &str = "No text";
pub const ZERO_COUNT: &str = "0";

static SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Why a single field could not be read from a candidate element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMiss {
    /// The element or attribute is not present.
    Absent,
    /// The element is present but carries no usable value.
    Empty,
}

pub type Field = Result<String, ExtractionMiss>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementFields {
    pub replies: Field,
    pub retweets: Field,
    pub likes: Field,
}

/// A post extracted from one snapshot, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub body: Field,
    pub timestamp: Field,
    pub engagement: EngagementFields,
    pub media_refs: Vec<String>,
}

impl Candidate {
    /// True when no field at all could be read.
    pub fn is_hollow(&self) -> bool {
        self.body.is_err()
            && self.timestamp.is_err()
            && self.engagement.replies.is_err()
            && self.engagement.retweets.is_err()
            && self.engagement.likes.is_err()
            && self.media_refs.is_empty()
    }

    pub fn body_or_sentinel(&self) -> &str {
        self.body.as_deref().unwrap_or(NO_TEXT)
    }

    pub fn timestamp_or_sentinel(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(UNKNOWN_TIMESTAMP)
    }

    /// Collapse field misses into their sentinel values.
    pub fn into_record(self, owner: &str, fingerprint: String) -> Record {
        let body = self.body_or_sentinel().to_string();
        let timestamp = self.timestamp_or_sentinel().to_string();
        Record {
            fingerprint,
            owner: owner.to_string(),
            timestamp,
            body,
            engagement: Engagement {
                replies: self.engagement.replies.unwrap_or_else(|_| ZERO_COUNT.to_string()),
                retweets: self
                    .engagement
                    .retweets
                    .unwrap_or_else(|_| ZERO_COUNT.to_string()),
                likes: self.engagement.likes.unwrap_or_else(|_| ZERO_COUNT.to_string()),
            },
            media_refs: self.media_refs,
            downloaded_media: Vec::new(),
        }
    }
}

/// Displayed engagement counts, kept in their on-page string form ("1.2K").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub replies: String,
    pub retweets: String,
    pub likes: String,
}

/// An accepted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub fingerprint: String,
    pub owner: String,
    pub timestamp: String,
    pub body: String,
    pub engagement: Engagement,
    pub media_refs: Vec<String>,
    pub downloaded_media: Vec<String>,
}

pub fn normalize_whitespace(text: &str) -> String {
    let text = text.trim();
    let spaced = SPACE_REGEX.replace_all(text, " ");
    NEWLINE_REGEX.replace_all(&spaced, "\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hollow() -> Candidate {
        Candidate {
            body: Err(ExtractionMiss::Absent),
            timestamp: Err(ExtractionMiss::Absent),
            engagement: EngagementFields {
                replies: Err(ExtractionMiss::Absent),
                retweets: Err(ExtractionMiss::Empty),
                likes: Err(ExtractionMiss::Absent),
            },
            media_refs: Vec::new(),
        }
    }

    #[test]
    fn test_misses_collapse_to_sentinels() {
        let record = hollow().into_record("someone", "fp".to_string());

        assert_eq!(record.body, NO_TEXT);
        assert_eq!(record.timestamp, UNKNOWN_TIMESTAMP);
        assert_eq!(record.engagement.replies, ZERO_COUNT);
        assert_eq!(record.engagement.retweets, ZERO_COUNT);
        assert_eq!(record.engagement.likes, ZERO_COUNT);
        assert!(record.downloaded_media.is_empty());
    }

    #[test]
    fn test_hollow_detection() {
        let mut candidate = hollow();
        assert!(candidate.is_hollow());

        candidate.engagement.likes = Ok("3".to_string());
        assert!(!candidate.is_hollow());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n\n\n c "), "a b\n\n c");
    }
}
