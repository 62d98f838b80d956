use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Idle gap after which accumulated drift is forgotten instead of paid back
pub const DRIFT_RESET_THRESHOLD: Duration = Duration::from_secs(1);

const THRESHOLD_NANOS: i64 = DRIFT_RESET_THRESHOLD.as_nanos() as i64;

/// Marks a ledger that has not seen a sub-step yet
const UNSET: u64 = u64::MAX;

/// Timing state consulted by a rate controller between sub-steps
///
/// - `last_step`: timestamp (nanos on the caller's [`TimeSource`](crate::TimeSource)) of the
///   last sub-step boundary, i.e. when the previous pacing sleep ended
/// - `carried`: signed drift in nanos. Positive is debt still owed as sleep, negative is
///   credit that shortens the next sleeps
///
/// Stored as atomics so an observer never blocks the read loop. Only one read loop writes.
#[derive(Debug)]
pub struct DriftLedger {
    last_step: AtomicU64,
    carried: AtomicI64,
}

impl DriftLedger {
    pub const fn new() -> Self {
        Self { last_step: AtomicU64::new(UNSET), carried: AtomicI64::new(0) }
    }

    /// Timestamp of the last sub-step boundary, if any
    pub fn last_step(&self) -> Option<u64> {
        match self.last_step.load(Ordering::Acquire) {
            UNSET => None,
            nanos => Some(nanos),
        }
    }

    /// Carried drift in nanos (positive = debt, negative = credit)
    pub fn carried(&self) -> i64 {
        self.carried.load(Ordering::Acquire)
    }

    /// Gap since the last sub-step, or `None` when the ledger must be reset
    ///
    /// A ledger is reset when it has never been used or when the caller has been idle for
    /// longer than [`DRIFT_RESET_THRESHOLD`].
    #[inline]
    pub fn gap(&self, now_nanos: u64) -> Option<u64> {
        let last = self.last_step()?;
        let gap = now_nanos.saturating_sub(last);
        if gap > THRESHOLD_NANOS as u64 {
            return None;
        }
        Some(gap)
    }

    /// Record the next boundary and the drift carried into it
    ///
    /// Credit is clamped to one threshold's worth so a long run of slow sub-reads cannot
    /// build up an unbounded catch-up burst.
    #[inline]
    pub fn record(&self, boundary_nanos: u64, carried: i64) {
        self.carried.store(carried.max(-THRESHOLD_NANOS), Ordering::Release);
        self.last_step.store(boundary_nanos, Ordering::Release);
    }

    /// Credit `nanos` of already-slept time back to the ledger
    #[inline]
    pub fn credit(&self, nanos: u64) {
        let nanos = nanos.min(THRESHOLD_NANOS as u64) as i64;
        let carried = self.carried.load(Ordering::Acquire);
        self.carried.store(carried.saturating_sub(nanos).max(-THRESHOLD_NANOS), Ordering::Release);
    }

    /// Neutral state anchored at `now_nanos`: no credit, no debt
    pub fn reset_at(&self, now_nanos: u64) {
        self.carried.store(0, Ordering::Release);
        self.last_step.store(now_nanos, Ordering::Release);
    }

    /// Forget everything; the next sub-step starts a fresh ledger
    pub fn clear(&self) {
        self.carried.store(0, Ordering::Release);
        self.last_step.store(UNSET, Ordering::Release);
    }
}

impl Default for DriftLedger {
    fn default() -> Self {
        Self::new()
    }
}
