use std::time::Duration;

use tracing::debug;

use crate::interval::PacingInterval;
use crate::ledger::DriftLedger;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Maximum bytes to request in the next sub-step
///
/// A non-positive `limit` means unlimited and returns `remaining` untouched. Otherwise the
/// allowance is `limit / steps_per_second`, bounded by `remaining`.
///
/// A positive limit below `steps_per_second` would round the allowance down to zero. Rather
/// than granting the entire remaining buffer in that case, which would ignore the limit, one
/// byte is granted per sub-step and [`ideal_sleep`] stretches the step to keep the rate.
#[inline]
pub fn allowance(remaining: usize, limit: i64, steps_per_second: u64) -> usize {
    if limit <= 0 {
        return remaining;
    }

    let per_step = (limit as u64 / steps_per_second.max(1)).max(1);
    remaining.min(usize::try_from(per_step).unwrap_or(usize::MAX))
}

/// Ideal time to spend delivering `allowed` bytes at `limit` bytes/second
///
/// Computed against a full second in integer nanoseconds, so neither `limit / N` nor
/// `1s / interval` is truncated. Intervals that do not divide one second and limits that are
/// not a multiple of `N` still converge on `limit`.
#[inline]
pub fn ideal_sleep(allowed: usize, limit: i64) -> Duration {
    if limit <= 0 || allowed == 0 {
        return Duration::ZERO;
    }

    let nanos = allowed as u128 * NANOS_PER_SEC / limit as u128;
    Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
}

/// Pacing strategy consulted once per sub-step by a throttled reader
///
/// Implementations keep their timing state in atomics so they can be shared behind `&self`.
/// `limit <= 0` never reaches [`pace_at`](Self::pace_at): unlimited reads skip the
/// controller entirely.
pub trait RateController: Send + Sync {
    /// Pacing interval this controller divides each second into
    fn interval(&self) -> PacingInterval;

    /// Bytes allowed in the next sub-step
    fn allowance(&self, remaining: usize, limit: i64) -> usize {
        allowance(remaining, limit, self.interval().steps_per_second())
    }

    /// Ideal duration of a sub-step delivering `allowed` bytes
    fn ideal_sleep(&self, allowed: usize, limit: i64) -> Duration {
        ideal_sleep(allowed, limit)
    }

    /// Sleep to issue before the sub-step, given the current time and its ideal duration
    fn pace_at(&self, now_nanos: u64, ideal: Duration) -> Duration;

    /// Return sleep that paid for bytes the sub-read did not deliver
    fn refund(&self, _unused: Duration) {}

    /// Drop all timing history
    fn reset(&self);
}

/// Credit/debt pacing with drift correction
///
/// Each sub-step sleeps `ideal - elapsed + carried`, where `elapsed` is the time since the
/// previous sub-step boundary. A negative result is not slept; it is carried forward as
/// credit so slow sub-reads are made up by later ones. After an idle gap longer than
/// [`DRIFT_RESET_THRESHOLD`](crate::DRIFT_RESET_THRESHOLD) the ledger starts fresh instead of
/// paying the pause back with a burst.
#[derive(Debug, Default)]
pub struct DriftCorrected {
    interval: PacingInterval,
    ledger: DriftLedger,
}

impl DriftCorrected {
    pub fn new(interval: PacingInterval) -> Self {
        Self { interval, ledger: DriftLedger::new() }
    }

    pub fn ledger(&self) -> &DriftLedger {
        &self.ledger
    }
}

impl RateController for DriftCorrected {
    fn interval(&self) -> PacingInterval {
        self.interval
    }

    fn pace_at(&self, now_nanos: u64, ideal: Duration) -> Duration {
        let ideal = ideal.as_nanos().min(i64::MAX as u128) as i64;

        let (elapsed, carried) = match self.ledger.gap(now_nanos) {
            Some(gap) => (gap as i64, self.ledger.carried()),
            None => {
                if self.ledger.last_step().is_some() {
                    debug!("Idle gap exceeded drift threshold, resetting ledger (carried {}ns)", self.ledger.carried());
                }
                self.ledger.reset_at(now_nanos);
                (0, 0)
            }
        };

        let sleep = ideal.saturating_sub(elapsed).saturating_add(carried);
        if sleep > 0 {
            self.ledger.record(now_nanos.saturating_add(sleep as u64), 0);
            Duration::from_nanos(sleep as u64)
        } else {
            self.ledger.record(now_nanos, sleep);
            Duration::ZERO
        }
    }

    fn refund(&self, unused: Duration) {
        if !unused.is_zero() {
            self.ledger.credit(unused.as_nanos().min(u64::MAX as u128) as u64);
        }
    }

    fn reset(&self) {
        self.ledger.clear();
    }
}

/// Plain timestamp pacing without carried drift
///
/// Sleeps `ideal - elapsed` when positive and otherwise proceeds immediately. Time lost to a
/// slow sub-read is never made up, so the aggregate rate can fall below the limit.
#[derive(Debug, Default)]
pub struct TimestampPacer {
    interval: PacingInterval,
    ledger: DriftLedger,
}

impl TimestampPacer {
    pub fn new(interval: PacingInterval) -> Self {
        Self { interval, ledger: DriftLedger::new() }
    }
}

impl RateController for TimestampPacer {
    fn interval(&self) -> PacingInterval {
        self.interval
    }

    fn pace_at(&self, now_nanos: u64, ideal: Duration) -> Duration {
        let elapsed = match (self.ledger.last_step(), self.ledger.gap(now_nanos)) {
            (None, _) => Duration::ZERO,
            (Some(_), Some(gap)) => Duration::from_nanos(gap),
            (Some(_), None) => return self.settle(now_nanos, Duration::ZERO),
        };

        self.settle(now_nanos, ideal.saturating_sub(elapsed))
    }

    fn reset(&self) {
        self.ledger.clear();
    }
}

impl TimestampPacer {
    #[inline]
    fn settle(&self, now_nanos: u64, sleep: Duration) -> Duration {
        self.ledger.record(now_nanos.saturating_add(sleep.as_nanos() as u64), 0);
        sleep
    }
}
