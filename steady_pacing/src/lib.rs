//! # steady_pacing
//!
//! Timing core for smooth, non-bursty byte pacing: per-sub-step allowances, ideal sleep
//! durations and the drift ledger that keeps long-run throughput on the configured rate.

pub mod config_loader;
pub mod controller;
pub mod error;
pub mod interval;
pub mod ledger;
pub mod time;

pub use config_loader::PacingConfig;
pub use config_loader::load_config;
pub use config_loader::load_config_or_default;
pub use controller::DriftCorrected;
pub use controller::RateController;
pub use controller::TimestampPacer;
pub use controller::allowance;
pub use controller::ideal_sleep;
pub use error::PacingError;
pub use error::Result;
pub use interval::DEFAULT_INTERVAL;
pub use interval::PacingInterval;
pub use ledger::DRIFT_RESET_THRESHOLD;
pub use ledger::DriftLedger;
pub use time::TimeSource;
