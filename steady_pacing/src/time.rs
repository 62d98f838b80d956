use tokio::time::Instant;

/// Monotonic time source for pacing
///
/// Backed by `tokio::time::Instant` so that a paused Tokio clock drives the async reader
/// deterministically. Outside a runtime it behaves like `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct TimeSource {
    epoch: Instant,
}

impl TimeSource {
    /// Create a new time source with the current time as epoch
    #[inline(always)]
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }

    /// Nanoseconds elapsed since the epoch
    #[inline(always)]
    pub fn now_nanos(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::new()
    }
}
