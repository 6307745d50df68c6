//! Domain model for automation scenarios
//!
//! Everything here is an immutable definition loaded before a session
//! starts. Runtime state (enabled events, counters) lives in
//! `processing::ProcessingState`.

mod action;
mod dumb;
mod event;
mod geometry;
mod repeat;

pub use action::{
    Action, ClickPosition, CounterOperation, EventToggle, ExtraValue, ToggleTarget, ToggleType,
};
pub use dumb::{DumbAction, DumbScenario};
pub use event::{
    Condition, ConditionOperator, ConditionPolarity, Event, ReferenceImage, Scenario,
    CONDITION_THRESHOLD_MAX,
};
pub use geometry::{Area, Point};
pub use repeat::Repeatable;

/// Serialize a `Duration` as integer milliseconds
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Serialize an `Option<Duration>` as optional integer milliseconds
pub(crate) mod opt_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
