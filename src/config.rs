//! Scenario snapshot loading and pre-session validation
//!
//! Scenarios load as immutable snapshots from TOML or JSON files before a
//! session starts; the engines never touch persistence mid-session.
//! Reference image content lives in separate files next to the snapshot
//! and is read here as opaque bytes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detection::{DETECTION_QUALITY_MAX, DETECTION_QUALITY_MIN};
use crate::error::ConfigError;
use crate::model::{
    Action, Area, ClickPosition, Condition, ConditionOperator, ConditionPolarity, DumbAction,
    DumbScenario, Event, ReferenceImage, Repeatable, Scenario, ToggleTarget,
    CONDITION_THRESHOLD_MAX,
};

fn default_detection_quality() -> f64 {
    1200.0
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// File representation of a smart scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_detection_quality")]
    pub detection_quality: f64,
    #[serde(default)]
    pub randomize: bool,
    pub events: Vec<EventFile>,
}

/// File representation of an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    pub operator: ConditionOperator,
    pub conditions: Vec<ConditionFile>,
    pub actions: Vec<Action>,
}

/// File representation of a condition; the image content is referenced by
/// path, relative to the snapshot's base directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionFile {
    pub id: i64,
    pub image: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
    pub threshold: u8,
    pub polarity: ConditionPolarity,
}

impl ScenarioFile {
    /// Parse a snapshot file, by extension: `.json` or TOML otherwise
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|error| ConfigError::Io(error.to_string()))?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|error| ConfigError::Parse(error.to_string()))
        } else {
            toml::from_str(&content).map_err(|error| ConfigError::Parse(error.to_string()))
        }
    }

    /// Resolve image references against `base_path` and build the validated
    /// domain scenario
    pub fn into_scenario(self, base_path: &Path) -> Result<Scenario, ConfigError> {
        let mut events = Vec::with_capacity(self.events.len());
        for event_file in self.events {
            let mut conditions = Vec::with_capacity(event_file.conditions.len());
            for condition_file in event_file.conditions {
                let data = std::fs::read(base_path.join(&condition_file.image))
                    .map_err(|error| ConfigError::Io(error.to_string()))?;
                conditions.push(Condition {
                    id: condition_file.id,
                    image: ReferenceImage::new(condition_file.width, condition_file.height, data),
                    area: condition_file.area,
                    threshold: condition_file.threshold,
                    polarity: condition_file.polarity,
                });
            }
            events.push(Event {
                id: event_file.id,
                name: event_file.name,
                priority: event_file.priority,
                operator: event_file.operator,
                conditions,
                actions: event_file.actions,
            });
        }

        let scenario = Scenario {
            id: self.id,
            name: self.name,
            detection_quality: self.detection_quality,
            randomize: self.randomize,
            events,
        };
        validate_scenario(&scenario)?;
        Ok(scenario)
    }
}

/// Parse a dumb scenario snapshot and validate it
pub fn load_dumb_scenario(path: &Path) -> Result<DumbScenario, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|error| ConfigError::Io(error.to_string()))?;

    let scenario: DumbScenario = if is_json(path) {
        serde_json::from_str(&content).map_err(|error| ConfigError::Parse(error.to_string()))?
    } else {
        toml::from_str(&content).map_err(|error| ConfigError::Parse(error.to_string()))?
    };

    validate_dumb_scenario(&scenario)?;
    Ok(scenario)
}

/// Reject scenario definitions the engine must never process
pub fn validate_scenario(scenario: &Scenario) -> Result<(), ConfigError> {
    if scenario.name.is_empty() {
        return Err(ConfigError::Invalid("scenario name is empty".to_string()));
    }
    if !(DETECTION_QUALITY_MIN..=DETECTION_QUALITY_MAX).contains(&scenario.detection_quality) {
        return Err(ConfigError::Invalid(format!(
            "detection quality {} is outside [{DETECTION_QUALITY_MIN}, {DETECTION_QUALITY_MAX}]",
            scenario.detection_quality
        )));
    }
    if scenario.events.is_empty() {
        return Err(ConfigError::Invalid("scenario has no events".to_string()));
    }

    let event_ids: HashSet<i64> = scenario.events.iter().map(|event| event.id).collect();

    for event in &scenario.events {
        if event.conditions.is_empty() {
            return Err(invalid_event(event, "has no conditions"));
        }
        if event.actions.is_empty() {
            return Err(invalid_event(event, "has no actions"));
        }

        let condition_ids: HashSet<i64> =
            event.conditions.iter().map(|condition| condition.id).collect();
        for condition in &event.conditions {
            if condition.threshold > CONDITION_THRESHOLD_MAX {
                return Err(invalid_event(
                    event,
                    &format!("condition threshold {} above max", condition.threshold),
                ));
            }
            if condition.image.data.is_empty() {
                return Err(invalid_event(event, "condition image is empty"));
            }
        }

        for action in &event.actions {
            validate_action(event, action, &condition_ids, &event_ids)?;
        }
    }
    Ok(())
}

fn validate_action(
    event: &Event,
    action: &Action,
    condition_ids: &HashSet<i64>,
    event_ids: &HashSet<i64>,
) -> Result<(), ConfigError> {
    match action {
        Action::Click {
            position,
            press_duration,
            repeat,
        } => {
            if press_duration.is_zero() {
                return Err(invalid_event(event, "click press duration is zero"));
            }
            validate_smart_repeat(event, repeat)?;
            match position {
                ClickPosition::Fixed(_) => {}
                ClickPosition::OnCondition {
                    condition_id: Some(id),
                } => {
                    if !condition_ids.contains(id) {
                        return Err(invalid_event(
                            event,
                            &format!("click targets unknown condition {id}"),
                        ));
                    }
                }
                ClickPosition::OnCondition { condition_id: None } => {
                    // Without an explicit target only an OR event records a
                    // first match to click on.
                    if event.operator != ConditionOperator::Or {
                        return Err(invalid_event(
                            event,
                            "condition-targeted click on an AND event needs a condition id",
                        ));
                    }
                }
            }
        }
        Action::Swipe {
            duration, repeat, ..
        } => {
            if duration.is_zero() {
                return Err(invalid_event(event, "swipe duration is zero"));
            }
            validate_smart_repeat(event, repeat)?;
        }
        Action::Pause { duration } => {
            if duration.is_zero() {
                return Err(invalid_event(event, "pause duration is zero"));
            }
        }
        Action::Intent { action, .. } => {
            if action.is_empty() {
                return Err(invalid_event(event, "intent action is empty"));
            }
        }
        Action::ToggleEvent { target } => {
            if let ToggleTarget::Targets(toggles) = target {
                if toggles.is_empty() {
                    return Err(invalid_event(event, "event toggle has no targets"));
                }
                for toggle in toggles {
                    if !event_ids.contains(&toggle.target_event_id) {
                        return Err(invalid_event(
                            event,
                            &format!("toggle targets unknown event {}", toggle.target_event_id),
                        ));
                    }
                }
            }
        }
        Action::ChangeCounter { counter_name, .. } => {
            if counter_name.is_empty() {
                return Err(invalid_event(event, "counter name is empty"));
            }
        }
    }
    Ok(())
}

/// Smart event actions must terminate: infinite repeat would starve the
/// frame loop
fn validate_smart_repeat(event: &Event, repeat: &Repeatable) -> Result<(), ConfigError> {
    if repeat.is_repeat_infinite {
        return Err(invalid_event(event, "smart action repeat cannot be infinite"));
    }
    if repeat.repeat_count == 0 {
        return Err(invalid_event(event, "smart action repeat count is zero"));
    }
    Ok(())
}

fn invalid_event(event: &Event, message: &str) -> ConfigError {
    ConfigError::Invalid(format!("event '{}': {message}", event.name))
}

/// Reject dumb scenario definitions the engine must never replay
pub fn validate_dumb_scenario(scenario: &DumbScenario) -> Result<(), ConfigError> {
    if !scenario.is_valid() {
        return Err(ConfigError::Invalid(
            "dumb scenario needs a name and at least one action".to_string(),
        ));
    }
    if !scenario.repeat.is_repeat_infinite && scenario.repeat.repeat_count == 0 {
        return Err(ConfigError::Invalid(
            "dumb scenario repeat count is zero".to_string(),
        ));
    }

    for action in &scenario.actions {
        let duration = match action {
            DumbAction::Click { press_duration, .. } => press_duration,
            DumbAction::Swipe { duration, .. } => duration,
            DumbAction::Pause { duration, .. } => duration,
        };
        if duration.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "dumb action '{}' has a zero duration",
                action.name()
            )));
        }
    }
    Ok(())
}
