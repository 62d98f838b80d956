//! Task-suspending variant of [`ThrottledReader`](crate::ThrottledReader) for Tokio streams.
//!
//! The pacing sleep is a `tokio::time::sleep` awaited on the calling task, so a paused test
//! clock (`#[tokio::test(start_paused = true)]`) drives it deterministically.
use std::fmt;
use std::io;

use steady_pacing::DriftCorrected;
use steady_pacing::PacingConfig;
use steady_pacing::PacingInterval;
use steady_pacing::RateController;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::control::ThrottleHandle;
use crate::outcome::ReadOutcome;
use crate::shared::Pacer;

/// Async reader that paces an inner `AsyncRead` to a rate in bytes/second
pub struct AsyncThrottledReader<R, C = DriftCorrected> {
    inner: R,
    pacer: Pacer<C>,
    pending_error: Option<io::Error>,
}

impl<R: AsyncRead + Unpin> AsyncThrottledReader<R> {
    pub fn new(inner: R, limit: i64) -> Self {
        Self::with_controller(inner, limit, DriftCorrected::default())
    }

    pub fn with_interval(inner: R, limit: i64, interval: PacingInterval) -> Self {
        Self::with_controller(inner, limit, DriftCorrected::new(interval))
    }

    pub fn from_config(inner: R, config: &PacingConfig) -> steady_pacing::Result<Self> {
        Ok(Self::with_interval(inner, config.limit, config.interval()?))
    }
}

impl<R: AsyncRead + Unpin, C: RateController> AsyncThrottledReader<R, C> {
    pub fn with_controller(inner: R, limit: i64, controller: C) -> Self {
        Self { inner, pacer: Pacer::new(controller, limit), pending_error: None }
    }

    /// Fill as much of `buf` as the stream allows, pacing each sub-read
    ///
    /// Same contract as [`ThrottledReader::read_paced`](crate::ThrottledReader::read_paced).
    /// Dropping the future between sub-steps is safe: bytes already written to `buf` are
    /// reflected in [`current_progress`](Self::current_progress).
    pub async fn read_paced(&mut self, buf: &mut [u8]) -> ReadOutcome {
        self.pacer.begin();
        let mut filled = 0;

        while filled < buf.len() {
            let step = self.pacer.plan(buf.len() - filled);
            if !step.sleep.is_zero() {
                tokio::time::sleep(step.sleep).await;
            }

            match self.inner.read(&mut buf[filled..filled + step.allowed]).await {
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

    /// `std::io::Read`-style convenience over [`read_paced`](Self::read_paced)
    ///
    /// Returns `Ok(0)` at end-of-data. An error that follows a partial read is returned by
    /// the next call.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }

        let (result, pending) = self.read_paced(buf).await.into_io();
        self.pending_error = pending;
        result
    }

    /// Read until end-of-data, appending to `out`
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>, chunk: usize) -> io::Result<usize> {
        let mut buf = vec![0u8; chunk.max(1)];
        let mut total = 0;
        loop {
            match self.read(&mut buf).await? {
                0 => return Ok(total),
                n => {
                    out.extend_from_slice(&buf[..n]);
                    total += n;
                }
            }
        }
    }

    pub fn handle(&self) -> ThrottleHandle {
        ThrottleHandle::new(self.pacer.shared().clone())
    }

    pub fn update_limit(&self, limit: i64) {
        self.handle().update_limit(limit);
    }

    pub fn limit(&self) -> i64 {
        self.pacer.shared().limit()
    }

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

impl<R, C> fmt::Debug for AsyncThrottledReader<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncThrottledReader")
            .field("limit", &self.pacer.shared().limit())
            .field("progress", &self.pacer.shared().progress())
            .finish_non_exhaustive()
    }
}
