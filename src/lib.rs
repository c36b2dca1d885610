pub mod config;
pub mod dedup;
pub mod driver;
pub mod extractor;
pub mod fetcher;
pub mod harvest;
