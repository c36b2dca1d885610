//! Session-wide duplicate suppression.
//!
//! A fingerprint is the md5 of the first `width` characters of the body joined
//! with the reported timestamp. Two distinct posts sharing both collide and the
//! later one is dropped; widening `width` narrows that window.

use crate::extractor::Candidate;
use std::collections::HashSet;

pub const DEFAULT_FINGERPRINT_WIDTH: usize = 50;

pub fn fingerprint(body: &str, timestamp: &str, width: usize) -> String {
    let prefix: String = body.chars().take(width).collect();
    format!("{:x}", md5::compute(format!("{prefix}_{timestamp}")))
}

#[derive(Debug, Clone)]
pub struct Deduplicator {
    width: usize,
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            seen: HashSet::new(),
        }
    }

    pub fn fingerprint_of(&self, candidate: &Candidate) -> String {
        fingerprint(
            candidate.body_or_sentinel(),
            candidate.timestamp_or_sentinel(),
            self.width,
        )
    }

    /// Register the candidate's fingerprint. Returns it iff it was not seen
    /// before during this session.
    pub fn accept(&mut self, candidate: &Candidate) -> Option<String> {
        let fingerprint = self.fingerprint_of(candidate);
        self.seen.insert(fingerprint.clone()).then_some(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_FINGERPRINT_WIDTH)
    }
}
