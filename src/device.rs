//! Device interaction boundary
//!
//! Implementations marshal calls to whatever execution context the platform
//! interaction layer mandates; the engines treat every call as blocking
//! until the interaction has been dispatched.

use std::time::Duration;

use crate::error::DeviceError;
use crate::model::{ExtraValue, Point};

/// Description of a single-stroke gesture
#[derive(Debug, Clone, PartialEq)]
pub struct GestureStroke {
    /// One point for a press, two for a swipe
    pub path: Vec<Point>,
    pub duration: Duration,
}

impl GestureStroke {
    /// A press-and-release at one point
    pub fn tap(point: Point, duration: Duration) -> Self {
        Self {
            path: vec![point],
            duration,
        }
    }

    /// A two-point stroke
    pub fn swipe(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            path: vec![from, to],
            duration,
        }
    }
}

/// Payload dispatched as a broadcast or an activity start
#[derive(Debug, Clone, PartialEq)]
pub struct IntentPayload {
    pub action: String,
    pub flags: u32,
    pub component: Option<String>,
    pub extras: Vec<(String, ExtraValue)>,
}

/// External capability performing the actual device input
///
/// A dispatched gesture cannot be aborted mid-stroke; rejections are
/// session-ending for the calling engine.
pub trait DeviceExecutor: Send + Sync {
    /// Dispatch a gesture, blocking until it has been handed to the platform
    fn execute_gesture(&self, stroke: &GestureStroke) -> Result<(), DeviceError>;

    fn execute_start_activity(&self, intent: &IntentPayload) -> Result<(), DeviceError>;

    fn execute_send_broadcast(&self, intent: &IntentPayload) -> Result<(), DeviceError>;
}
