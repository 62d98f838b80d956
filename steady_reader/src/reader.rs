use std::fmt;
use std::io;
use std::io::Read;

use steady_pacing::DriftCorrected;
use steady_pacing::PacingConfig;
use steady_pacing::PacingInterval;
use steady_pacing::RateController;
use tracing::debug;

use crate::control::ThrottleHandle;
use crate::outcome::ReadOutcome;
use crate::release::Release;
use crate::shared::Pacer;

type ReleaseFn<R> = fn(&mut R) -> io::Result<()>;

/// Blocking reader that paces an inner `Read` to a rate in bytes/second
///
/// Each call splits the caller's buffer into sub-reads of at most one pacing interval's
/// worth of bytes and sleeps on the calling thread before each one. No threads are spawned.
///
/// Concurrent read calls on one instance are not supported; use a [`ThrottleHandle`] to
/// change the limit or watch progress from elsewhere.
pub struct ThrottledReader<R, C = DriftCorrected> {
    inner: R,
    pacer: Pacer<C>,
    release: Option<ReleaseFn<R>>,
    pending_error: Option<io::Error>,
}

impl<R: Read> ThrottledReader<R> {
    /// Wrap `inner` with the default 50ms pacing interval
    pub fn new(inner: R, limit: i64) -> Self {
        Self::with_controller(inner, limit, DriftCorrected::default())
    }

    pub fn with_interval(inner: R, limit: i64, interval: PacingInterval) -> Self {
        Self::with_controller(inner, limit, DriftCorrected::new(interval))
    }

    /// Build from loaded settings; an invalid interval fails here, not during reads
    pub fn from_config(inner: R, config: &PacingConfig) -> steady_pacing::Result<Self> {
        Ok(Self::with_interval(inner, config.limit, config.interval()?))
    }
}

impl<R: Read + Release> ThrottledReader<R> {
    /// Wrap a stream whose resources are released by [`close`](Self::close)
    pub fn new_with_release(inner: R, limit: i64) -> Self {
        let mut reader = Self::new(inner, limit);
        reader.release = Some(R::release);
        reader
    }
}

impl<R: Read, C: RateController> ThrottledReader<R, C> {
    /// Wrap `inner` with a custom pacing strategy
    pub fn with_controller(inner: R, limit: i64, controller: C) -> Self {
        Self { inner, pacer: Pacer::new(controller, limit), release: None, pending_error: None }
    }

    /// Fill as much of `buf` as the stream allows, pacing each sub-read
    ///
    /// Stops early on end-of-data or an underlying error; the bytes obtained before that
    /// point are always part of `count`.
    pub fn read_paced(&mut self, buf: &mut [u8]) -> ReadOutcome {
        self.pacer.begin();
        let mut filled = 0;

        while filled < buf.len() {
            let step = self.pacer.plan(buf.len() - filled);
            if !step.sleep.is_zero() {
                std::thread::sleep(step.sleep);
            }

            match self.inner.read(&mut buf[filled..filled + step.allowed]) {
                Ok(0) => {
                    self.pacer.settle(&step, 0);
                    debug!("Underlying stream reached end of data after {filled} bytes");
                    return ReadOutcome::end_of_data(filled);
                }
                Ok(n) => {
                    self.pacer.settle(&step, n);
                    filled += n;
                }
                Err(err) => {
                    debug!("Underlying read failed after {filled} bytes: {err}");
                    return ReadOutcome::failed(filled, err);
                }
            }
        }

        ReadOutcome::complete(filled)
    }

    /// Release the underlying stream if it was built with `new_with_release`
    pub fn close(&mut self) -> io::Result<()> {
        match self.release {
            Some(release) => release(&mut self.inner),
            None => Ok(()),
        }
    }

    pub fn handle(&self) -> ThrottleHandle {
        ThrottleHandle::new(self.pacer.shared().clone())
    }

    /// Set the rate in bytes/second; `<= 0` disables pacing
    pub fn update_limit(&self, limit: i64) {
        self.handle().update_limit(limit);
    }

    pub fn limit(&self) -> i64 {
        self.pacer.shared().limit()
    }

    /// Bytes delivered by the most recent read call
    pub fn current_progress(&self) -> u64 {
        self.pacer.shared().progress()
    }

    pub fn controller(&self) -> &C {
        self.pacer.controller()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, C: RateController> Read for ThrottledReader<R, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }

        let (result, pending) = self.read_paced(buf).into_io();
        self.pending_error = pending;
        result
    }
}

impl<R, C> fmt::Debug for ThrottledReader<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottledReader")
            .field("limit", &self.pacer.shared().limit())
            .field("progress", &self.pacer.shared().progress())
            .field("releasable", &self.release.is_some())
            .finish_non_exhaustive()
    }
}
