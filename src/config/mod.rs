//! Run parameters for a harvest.
//!
//! `HarvestConfig::from_env` reads `HARVEST_*` variables on top of the
//! development defaults. Only the target identity has no default.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::dedup::DEFAULT_FINGERPRINT_WIDTH;

pub const ENV_TARGET: &str = "HARVEST_TARGET";
pub const ENV_MAX_RECORDS: &str = "HARVEST_MAX_RECORDS";
pub const ENV_MAX_SCROLLS: &str = "HARVEST_MAX_SCROLLS";
pub const ENV_SETTLE_MS: &str = "HARVEST_SETTLE_MS";
pub const ENV_STAGNATION_LIMIT: &str = "HARVEST_STAGNATION_LIMIT";
pub const ENV_DOWNLOAD_MEDIA: &str = "HARVEST_DOWNLOAD_MEDIA";
pub const ENV_MEDIA_DIR: &str = "HARVEST_MEDIA_DIR";
pub const ENV_MEDIA_TIMEOUT_MS: &str = "HARVEST_MEDIA_TIMEOUT_MS";
pub const ENV_FINGERPRINT_WIDTH: &str = "HARVEST_FINGERPRINT_WIDTH";
pub const ENV_NUDGE_PX: &str = "HARVEST_NUDGE_PX";
pub const ENV_NUDGE_SETTLE_MS: &str = "HARVEST_NUDGE_SETTLE_MS";
pub const ENV_INITIAL_WAIT_MS: &str = "HARVEST_INITIAL_WAIT_MS";
pub const ENV_WARMUP_SCROLLS: &str = "HARVEST_WARMUP_SCROLLS";
pub const ENV_WARMUP_PX: &str = "HARVEST_WARMUP_PX";
pub const ENV_WARMUP_SETTLE_MS: &str = "HARVEST_WARMUP_SETTLE_MS";
pub const ENV_SNAPSHOT_DIR: &str = "HARVEST_SNAPSHOT_DIR";
pub const ENV_OUTPUT_DIR: &str = "HARVEST_OUTPUT_DIR";

const DEFAULT_MAX_RECORDS: usize = 50;
const DEFAULT_MAX_SCROLLS: u32 = 40;
const DEFAULT_SETTLE_MS: u64 = 4000;
const DEFAULT_STAGNATION_LIMIT: u32 = 5;
const DEFAULT_MEDIA_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_NUDGE_PX: i64 = 1000;
const DEFAULT_NUDGE_SETTLE_MS: u64 = 2000;
const DEFAULT_INITIAL_WAIT_MS: u64 = 8000;
const DEFAULT_WARMUP_SCROLLS: u32 = 3;
const DEFAULT_WARMUP_PX: i64 = 500;
const DEFAULT_WARMUP_SETTLE_MS: u64 = 1000;
const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";
const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Handle whose feed is read.
    pub target: String,
    pub max_records: usize,
    /// Hard ceiling on scroll rounds.
    pub max_scrolls: u32,
    /// Wait after each bottom scroll.
    pub settle: Duration,
    /// Consecutive empty rounds before giving up.
    pub stagnation_limit: u32,
    pub download_media: bool,
    pub media_dir: PathBuf,
    pub media_timeout: Duration,
    /// Body characters feeding the fingerprint.
    pub fingerprint_width: usize,
    pub nudge_distance: i64,
    pub nudge_settle: Duration,
    pub initial_wait: Duration,
    pub warmup_scrolls: u32,
    pub warmup_distance: i64,
    pub warmup_settle: Duration,
    pub snapshot_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl HarvestConfig {
    /// Development defaults for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            media_dir: PathBuf::from(format!("media_{target}")),
            target,
            max_records: DEFAULT_MAX_RECORDS,
            max_scrolls: DEFAULT_MAX_SCROLLS,
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
            download_media: true,
            media_timeout: Duration::from_millis(DEFAULT_MEDIA_TIMEOUT_MS),
            fingerprint_width: DEFAULT_FINGERPRINT_WIDTH,
            nudge_distance: DEFAULT_NUDGE_PX,
            nudge_settle: Duration::from_millis(DEFAULT_NUDGE_SETTLE_MS),
            initial_wait: Duration::from_millis(DEFAULT_INITIAL_WAIT_MS),
            warmup_scrolls: DEFAULT_WARMUP_SCROLLS,
            warmup_distance: DEFAULT_WARMUP_PX,
            warmup_settle: Duration::from_millis(DEFAULT_WARMUP_SETTLE_MS),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Same limits with every wait set to zero. Used for replays.
    pub fn without_waits(mut self) -> Self {
        self.settle = Duration::ZERO;
        self.nudge_settle = Duration::ZERO;
        self.initial_wait = Duration::ZERO;
        self.warmup_settle = Duration::ZERO;
        self
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let target = env::var(ENV_TARGET)
            .ok()
            .map(|t| t.trim().trim_start_matches('@').to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingValue { field: ENV_TARGET })?;

        let mut cfg = Self::new(target);
        cfg.max_records = parse_env(ENV_MAX_RECORDS, cfg.max_records)?;
        cfg.max_scrolls = parse_env(ENV_MAX_SCROLLS, cfg.max_scrolls)?;
        cfg.settle = parse_millis(ENV_SETTLE_MS, cfg.settle)?;
        cfg.stagnation_limit = parse_env(ENV_STAGNATION_LIMIT, cfg.stagnation_limit)?;
        cfg.download_media = parse_flag(ENV_DOWNLOAD_MEDIA, cfg.download_media)?;
        if let Ok(dir) = env::var(ENV_MEDIA_DIR) {
            cfg.media_dir = PathBuf::from(dir);
        }
        cfg.media_timeout = parse_millis(ENV_MEDIA_TIMEOUT_MS, cfg.media_timeout)?;
        cfg.fingerprint_width = parse_env(ENV_FINGERPRINT_WIDTH, cfg.fingerprint_width)?;
        cfg.nudge_distance = parse_env(ENV_NUDGE_PX, cfg.nudge_distance)?;
        cfg.nudge_settle = parse_millis(ENV_NUDGE_SETTLE_MS, cfg.nudge_settle)?;
        cfg.initial_wait = parse_millis(ENV_INITIAL_WAIT_MS, cfg.initial_wait)?;
        cfg.warmup_scrolls = parse_env(ENV_WARMUP_SCROLLS, cfg.warmup_scrolls)?;
        cfg.warmup_distance = parse_env(ENV_WARMUP_PX, cfg.warmup_distance)?;
        cfg.warmup_settle = parse_millis(ENV_WARMUP_SETTLE_MS, cfg.warmup_settle)?;
        if let Ok(dir) = env::var(ENV_SNAPSHOT_DIR) {
            cfg.snapshot_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var(ENV_OUTPUT_DIR) {
            cfg.output_dir = PathBuf::from(dir);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (ENV_MAX_RECORDS, self.max_records as u64),
            (ENV_MAX_SCROLLS, u64::from(self.max_scrolls)),
            (ENV_STAGNATION_LIMIT, u64::from(self.stagnation_limit)),
            (ENV_FINGERPRINT_WIDTH, self.fingerprint_width as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_millis(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let millis = parse_env(key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

fn parse_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingValue { field: &'static str },
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingValue { field } => write!(f, "missing required '{}'", field),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
