//! Processing observation hooks
//!
//! Timing and match counters are a side observation of the session: the
//! engine reports through `ProcessingListener`, consumers decide what to
//! keep. `MetricsCollector` is the default accumulating implementation.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

/// Callbacks fired from the processing path
///
/// Implementations must be cheap; they run on the session worker thread.
pub trait ProcessingListener: Send + Sync {
    /// A frame was pulled and scanned
    fn on_frame_processed(&self) {}

    /// One event's conditions were evaluated
    fn on_event_evaluated(&self, event_id: i64, duration: Duration, fulfilled: bool) {
        let _ = (event_id, duration, fulfilled);
    }

    /// A triggered event's action sequence completed
    fn on_actions_executed(&self, event_id: i64, duration: Duration) {
        let _ = (event_id, duration);
    }

    /// The session ended; `error` carries the failure message when it did
    /// not stop cleanly
    fn on_session_ended(&self, error: Option<&str>) {
        let _ = error;
    }
}

/// Accumulated counters for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingMetrics {
    pub frames_processed: u64,
    pub events_matched: u64,
    /// Cumulative condition evaluation time per event id
    pub evaluation_time: HashMap<i64, Duration>,
    /// Cumulative action execution time per event id
    pub execution_time: HashMap<i64, Duration>,
}

/// Listener accumulating [`ProcessingMetrics`]
#[derive(Default)]
pub struct MetricsCollector {
    metrics: Mutex<ProcessingMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the counters accumulated so far
    pub fn snapshot(&self) -> ProcessingMetrics {
        self.metrics.lock().clone()
    }
}

impl ProcessingListener for MetricsCollector {
    fn on_frame_processed(&self) {
        self.metrics.lock().frames_processed += 1;
    }

    fn on_event_evaluated(&self, event_id: i64, duration: Duration, fulfilled: bool) {
        let mut metrics = self.metrics.lock();
        *metrics.evaluation_time.entry(event_id).or_default() += duration;
        if fulfilled {
            metrics.events_matched += 1;
        }
    }

    fn on_actions_executed(&self, event_id: i64, duration: Duration) {
        *self.metrics.lock().execution_time.entry(event_id).or_default() += duration;
    }
}
