use std::sync::Arc;

use tracing::debug;

use crate::shared::Shared;

/// Lock-free control surface of a throttled reader
///
/// Cheap to clone and safe to use from any thread while a read is in flight. A new limit
/// is picked up at the next sub-step, i.e. within one pacing interval.
#[derive(Debug, Clone)]
pub struct ThrottleHandle {
    shared: Arc<Shared>,
}

impl ThrottleHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Set the rate in bytes/second; `<= 0` disables pacing
    pub fn update_limit(&self, limit: i64) {
        self.shared.set_limit(limit);
        debug!("Rate limit updated to {limit} B/s");
    }

    /// Current rate in bytes/second
    pub fn limit(&self) -> i64 {
        self.shared.limit()
    }

    pub fn is_unlimited(&self) -> bool {
        self.shared.limit() <= 0
    }

    /// Bytes delivered so far by the most recent (or in-flight) read call
    ///
    /// Never exceeds the count that call will return, and never decreases within a call.
    pub fn current_progress(&self) -> u64 {
        self.shared.progress()
    }
}
