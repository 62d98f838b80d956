use std::fmt;
use std::time::Duration;

use crate::error::PacingError;
use crate::error::Result;

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Default pacing interval: one second is split into 20 sub-steps
pub const DEFAULT_INTERVAL: PacingInterval = PacingInterval(Duration::from_millis(50));

/// Fixed time slice into which one second of throughput is divided
///
/// Smaller intervals pace more smoothly at the cost of more sleeps per second.
/// Invariant: `0 < interval <= 1s`, so [`steps_per_second`](Self::steps_per_second) is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacingInterval(Duration);

impl PacingInterval {
    /// Validate and wrap an interval
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() || interval > ONE_SECOND {
            return Err(PacingError::InvalidInterval(interval));
        }
        Ok(Self(interval))
    }

    /// Interval expressed in whole milliseconds
    pub fn from_millis(millis: u64) -> Result<Self> {
        Self::new(Duration::from_millis(millis))
    }

    #[inline(always)]
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Number of sub-steps per second (`N`)
    #[inline(always)]
    pub fn steps_per_second(&self) -> u64 {
        (ONE_SECOND.as_nanos() / self.0.as_nanos()) as u64
    }
}

impl Default for PacingInterval {
    fn default() -> Self {
        DEFAULT_INTERVAL
    }
}

impl fmt::Display for PacingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
