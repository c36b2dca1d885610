#![no_main]

use libfuzzer_sys::fuzz_target;

use feedharvest::dedup::Deduplicator;
use feedharvest::driver::Snapshot;
use feedharvest::extractor::extract;

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let html = String::from_utf8_lossy(data).to_string();

    // Extraction and fingerprinting should never panic regardless of input
    let mut dedup = Deduplicator::default();
    for candidate in extract(&Snapshot::new(html)) {
        if let Some(fingerprint) = dedup.accept(&candidate) {
            let _ = candidate.into_record("fuzz", fingerprint);
        }
    }
});
