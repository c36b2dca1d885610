pub mod model;
pub mod selectors;

#[cfg(test)]
mod tests;

pub use model::{Candidate, Engagement, EngagementFields, ExtractionMiss, Field, Record};

use crate::driver::Snapshot;
use crate::fetcher::upgrade_media_url;
use model::normalize_whitespace;
use scraper::{ElementRef, Html, Selector};

/// Harvest every post visible in `snapshot`, in document order.
///
/// Field misses never fail the call; they are recorded on the candidate.
/// Elements where nothing at all could be read are skipped.
pub fn extract(snapshot: &Snapshot) -> Vec<Candidate> {
    let document = Html::parse_document(&snapshot.html);

    document
        .select(&selectors::POST)
        .map(extract_candidate)
        .filter(|candidate| !candidate.is_hollow())
        .collect()
}

fn extract_candidate(post: ElementRef<'_>) -> Candidate {
    Candidate {
        body: extract_body(post),
        timestamp: extract_timestamp(post),
        engagement: EngagementFields {
            replies: extract_count(post, &selectors::REPLY),
            retweets: extract_count(post, &selectors::RETWEET),
            likes: extract_count(post, &selectors::LIKE),
        },
        media_refs: extract_media_refs(post),
    }
}

fn extract_body(post: ElementRef<'_>) -> Field {
    let element = post
        .select(&selectors::BODY)
        .next()
        .ok_or(ExtractionMiss::Absent)?;
    let text = normalize_whitespace(&element.text().collect::<String>());
    if text.is_empty() {
        return Err(ExtractionMiss::Empty);
    }
    Ok(text)
}

fn extract_timestamp(post: ElementRef<'_>) -> Field {
    let element = post
        .select(&selectors::TIME)
        .next()
        .ok_or(ExtractionMiss::Absent)?;
    match element.value().attr("datetime").map(str::trim) {
        Some("") => Err(ExtractionMiss::Empty),
        Some(datetime) => Ok(datetime.to_string()),
        None => Err(ExtractionMiss::Absent),
    }
}

/// First span inside the engagement control; later spans are labels.
fn extract_count(post: ElementRef<'_>, selector: &Selector) -> Field {
    let span = post.select(selector).next().ok_or(ExtractionMiss::Absent)?;
    let text = span.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        return Err(ExtractionMiss::Empty);
    }
    Ok(text)
}

fn extract_media_refs(post: ElementRef<'_>) -> Vec<String> {
    post.select(&selectors::IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| src.contains(selectors::MEDIA_SRC_MARKER))
        .map(upgrade_media_url)
        .collect()
}
