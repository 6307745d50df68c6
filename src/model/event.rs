//! Events and their visual conditions

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::geometry::Area;

/// Highest accepted difference threshold for a condition match
pub const CONDITION_THRESHOLD_MAX: u8 = 20;

/// How the conditions of an event combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Every condition must be satisfied
    And,
    /// At least one condition must be satisfied
    Or,
}

/// Whether a condition expects its image on screen or gone from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionPolarity {
    Present,
    Absent,
}

/// Raw pixel content of a condition's reference image
///
/// The buffer is opaque to the engine; only the detector interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ReferenceImage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// A single visual match test against the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: i64,
    pub image: ReferenceImage,
    /// Restrict detection to this region; whole screen when absent
    pub area: Option<Area>,
    /// Allowed difference, 0 (exact) to [`CONDITION_THRESHOLD_MAX`]
    pub threshold: u8,
    pub polarity: ConditionPolarity,
}

/// A prioritized unit pairing visual conditions with actions
///
/// The definition is immutable; whether an event is currently enabled is
/// session state, not part of the event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub name: String,
    /// Lower values are scanned first
    pub priority: i32,
    pub operator: ConditionOperator,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

/// An immutable smart scenario snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub id: i64,
    pub name: String,
    /// Detector quality factor, see `detection::DETECTION_QUALITY_MIN`/`MAX`
    pub detection_quality: f64,
    /// Apply jitter to positions and durations during execution
    pub randomize: bool,
    pub events: Vec<Event>,
}

impl Scenario {
    /// Events in scan order: ascending priority, declaration order on ties
    pub fn events_by_priority(&self) -> Vec<&Event> {
        let mut ordered: Vec<&Event> = self.events.iter().collect();
        ordered.sort_by_key(|event| event.priority);
        ordered
    }
}
