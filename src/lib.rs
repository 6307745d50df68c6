//! visiontap
//!
//! An engine for automating repetitive on-screen interactions. A smart
//! scenario pairs prioritized events - visual conditions evaluated against
//! the current screen frame - with input actions; a dumb scenario replays a
//! fixed action sequence with no detection at all.
//!
//! Screen capture, pixel matching and device input stay outside the crate,
//! consumed through the [`FrameSource`], [`ImageDetector`] and
//! [`DeviceExecutor`] traits. One processing session runs at a time, on a
//! dedicated worker thread, and stops cooperatively.

pub mod cancel;
pub mod capture;
pub mod config;
pub mod detection;
pub mod device;
pub mod dumb;
pub mod error;
pub mod model;
pub mod processing;

// Re-export the types most integrations need
pub use cancel::CancellationToken;
pub use capture::{Frame, FramePoll, FrameSource};
pub use detection::{
    ConditionEvaluator, ConditionsResult, DetectionResult, ImageDetector, DETECTION_QUALITY_MAX,
    DETECTION_QUALITY_MIN,
};
pub use device::{DeviceExecutor, GestureStroke, IntentPayload};
pub use dumb::DumbEngine;
pub use error::{ConfigError, DetectorError, DeviceError, EngineError};
pub use model::{
    Action, Area, ClickPosition, Condition, ConditionOperator, ConditionPolarity, CounterOperation,
    DumbAction, DumbScenario, Event, EventToggle, ExtraValue, Point, ReferenceImage, Repeatable,
    Scenario, ToggleTarget, ToggleType,
};
pub use processing::{
    MetricsCollector, ProcessingListener, ProcessingMetrics, ProcessingState, ScenarioEngine,
    SessionState,
};
