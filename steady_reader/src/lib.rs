//! # steady_reader
//!
//! Byte-stream readers paced to a target rate in bytes/second.
//!
//! [`ThrottledReader`] wraps any `std::io::Read` and sleeps on the calling thread;
//! [`AsyncThrottledReader`] wraps any `tokio::io::AsyncRead` and sleeps on the calling task.
//! Each read is split into sub-reads of at most one pacing interval's worth of bytes, so the
//! stream is delivered steadily rather than in bursts. A [`ThrottleHandle`] changes the limit
//! and observes progress from another thread while a read is in flight.
//!
//! ```no_run
//! use std::io::Read;
//!
//! use steady_reader::ThrottledReader;
//!
//! let file = std::fs::File::open("video.ts")?;
//! let mut reader = ThrottledReader::new(file, 256 * 1024);
//! let handle = reader.handle();
//!
//! let mut buf = vec![0u8; 64 * 1024];
//! let n = reader.read(&mut buf)?;
//! handle.update_limit(0); // unlimited from the next sub-step on
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod async_reader;
pub mod control;
pub mod outcome;
pub mod reader;
pub mod release;
mod shared;

pub use async_reader::AsyncThrottledReader;
pub use control::ThrottleHandle;
pub use outcome::ReadOutcome;
pub use outcome::ReadStatus;
pub use reader::ThrottledReader;
pub use release::Release;
pub use steady_pacing::DriftCorrected;
pub use steady_pacing::PacingConfig;
pub use steady_pacing::PacingInterval;
pub use steady_pacing::RateController;
pub use steady_pacing::TimestampPacer;
