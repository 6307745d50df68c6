//! Actions executed when an event triggers

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use super::repeat::Repeatable;

/// How a click resolves its screen position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClickPosition {
    /// Always press the same point
    Fixed(Point),
    /// Press where a condition of the owning event matched; `None` targets
    /// the first satisfied condition of an OR event
    OnCondition { condition_id: Option<i64> },
}

/// State change applied to an event's enabled flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleType {
    Enable,
    Disable,
    Toggle,
}

/// One toggle applied to a specific event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventToggle {
    pub target_event_id: i64,
    pub toggle_type: ToggleType,
}

/// Which events a toggle action applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToggleTarget {
    /// Apply one toggle to every event of the scenario
    All(ToggleType),
    /// Apply per-event toggles
    Targets(Vec<EventToggle>),
}

/// Arithmetic applied to a named counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterOperation {
    Add,
    Minus,
    Set,
}

/// Typed extra attached to an intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// A single action of an event, executed in declared order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Click {
        position: ClickPosition,
        #[serde(with = "super::duration_ms")]
        press_duration: Duration,
        #[serde(default)]
        repeat: Repeatable,
    },
    Swipe {
        from: Point,
        to: Point,
        #[serde(with = "super::duration_ms")]
        duration: Duration,
        #[serde(default)]
        repeat: Repeatable,
    },
    Pause {
        #[serde(with = "super::duration_ms")]
        duration: Duration,
    },
    Intent {
        action: String,
        flags: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        #[serde(default)]
        extras: Vec<(String, ExtraValue)>,
        is_broadcast: bool,
    },
    ToggleEvent {
        target: ToggleTarget,
    },
    ChangeCounter {
        counter_name: String,
        operation: CounterOperation,
        value: i64,
    },
}
