//! Smart scenario processing
//!
//! - `ProcessingState` - session-scoped enabled flags and counters
//! - `ActionExecutor` - runs a triggered event's actions
//! - `ScenarioEngine` - the session state machine and frame loop
//! - `ProcessingListener` / `MetricsCollector` - timing observation hooks

mod executor;
mod metrics;
mod processor;
mod state;

pub use executor::{ActionExecutor, Jitter, DURATION_MAX_OFFSET_MS, POSITION_MAX_OFFSET_PX};
pub(crate) use executor::{jittered_duration, jittered_point};
pub use metrics::{MetricsCollector, ProcessingListener, ProcessingMetrics};
pub use processor::{ScenarioEngine, SessionState};
pub use state::ProcessingState;
