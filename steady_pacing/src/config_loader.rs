use std::path::Path;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::error::Result;
use crate::interval::PacingInterval;

const DEFAULT_INTERVAL_MS: u64 = 50;

/// Construction-time settings for a throttled reader
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pacing interval in milliseconds (1..=1000)
    pub interval_ms: u64,
    /// Initial rate limit in bytes/second; `<= 0` is unlimited
    pub limit: i64,
}

impl PacingConfig {
    /// Validated pacing interval
    pub fn interval(&self) -> Result<PacingInterval> {
        PacingInterval::from_millis(self.interval_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self { interval_ms: DEFAULT_INTERVAL_MS, limit: 0 }
    }
}

/// Load pacing settings from a file, overridden by `STEADY_*` environment variables
///
/// The interval is validated here so misconfiguration fails before any read.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PacingConfig> {
    let config = Config::builder().add_source(File::from(path.as_ref())).add_source(Environment::with_prefix("STEADY").try_parsing(true)).build()?;

    let pacing: PacingConfig = config.try_deserialize()?;
    pacing.interval()?;
    Ok(pacing)
}

/// Load pacing settings with fallback to defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> PacingConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => {
            tracing::info!("Loaded pacing config from {}", path.display());
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load pacing config from {}: {}. Using defaults.", path.display(), err);
            PacingConfig::default()
        }
    }
}
