use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use steady_pacing::RateController;
use steady_pacing::TimeSource;
use tracing::trace;

/// State shared between a read loop and its handles
#[derive(Debug)]
pub(crate) struct Shared {
    /// Bytes/second; `<= 0` is unlimited
    limit: AtomicI64,
    /// Bytes delivered by the current (or last) read call
    progress: AtomicU64,
}

impl Shared {
    pub(crate) fn new(limit: i64) -> Arc<Self> {
        Arc::new(Self { limit: AtomicI64::new(limit), progress: AtomicU64::new(0) })
    }

    #[inline]
    pub(crate) fn limit(&self) -> i64 {
        self.limit.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set_limit(&self, limit: i64) {
        self.limit.store(limit, Ordering::Release);
    }

    #[inline]
    pub(crate) fn progress(&self) -> u64 {
        self.progress.load(Ordering::Acquire)
    }
}

/// One planned sub-step of a read loop
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    /// Bytes to request from the underlying stream
    pub allowed: usize,
    /// Ideal duration of the sub-step at the sampled limit
    pub ideal: Duration,
    /// Sleep to issue before the sub-read
    pub sleep: Duration,
}

/// Pacing decisions shared by the blocking and async read loops
#[derive(Debug)]
pub(crate) struct Pacer<C> {
    controller: C,
    shared: Arc<Shared>,
    clock: TimeSource,
}

impl<C> Pacer<C> {
    pub(crate) fn new(controller: C, limit: i64) -> Self {
        Self { controller, shared: Shared::new(limit), clock: TimeSource::new() }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    pub(crate) fn controller(&self) -> &C {
        &self.controller
    }
}

impl<C: RateController> Pacer<C> {
    /// Start a top-level read call
    #[inline]
    pub(crate) fn begin(&self) {
        self.shared.progress.store(0, Ordering::Release);
    }

    /// Sample the limit and plan the next sub-step
    ///
    /// Unlimited sub-steps bypass the controller: no sleep and no ledger bookkeeping.
    #[inline]
    pub(crate) fn plan(&self, remaining: usize) -> Step {
        let limit = self.shared.limit();
        let allowed = self.controller.allowance(remaining, limit);
        if limit <= 0 {
            return Step { allowed, ideal: Duration::ZERO, sleep: Duration::ZERO };
        }

        let ideal = self.controller.ideal_sleep(allowed, limit);
        let sleep = self.controller.pace_at(self.clock.now_nanos(), ideal);
        trace!(limit, allowed, ?ideal, ?sleep, "Planned sub-step");

        Step { allowed, ideal, sleep }
    }

    /// Account for `obtained` bytes from the sub-read of `step`
    #[inline]
    pub(crate) fn settle(&self, step: &Step, obtained: usize) {
        self.shared.progress.fetch_add(obtained as u64, Ordering::AcqRel);

        if obtained < step.allowed && !step.ideal.is_zero() {
            let missing = (step.allowed - obtained) as u128;
            let unused = step.ideal.as_nanos() * missing / step.allowed as u128;
            self.controller.refund(Duration::from_nanos(unused as u64));
        }
    }
}
