//! Dumb scenarios: fixed action sequences without any detection

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use super::repeat::Repeatable;

/// A detection-free action replayed by the dumb engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DumbAction {
    Click {
        name: String,
        position: Point,
        #[serde(with = "super::duration_ms")]
        press_duration: Duration,
        #[serde(default)]
        repeat: Repeatable,
    },
    Swipe {
        name: String,
        from: Point,
        to: Point,
        #[serde(with = "super::duration_ms")]
        duration: Duration,
        #[serde(default)]
        repeat: Repeatable,
    },
    Pause {
        name: String,
        #[serde(with = "super::duration_ms")]
        duration: Duration,
    },
}

impl DumbAction {
    pub fn name(&self) -> &str {
        match self {
            DumbAction::Click { name, .. }
            | DumbAction::Swipe { name, .. }
            | DumbAction::Pause { name, .. } => name,
        }
    }
}

/// A flat ordered action list wrapped in a whole-scenario repeat envelope
///
/// Two repeat scopes compose: each action repeats per its own policy inside
/// every iteration of the scenario envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumbScenario {
    pub id: i64,
    pub name: String,
    pub actions: Vec<DumbAction>,
    /// Whole-scenario repetition
    pub repeat: Repeatable,
    /// Hard deadline for the whole run; unlimited when absent
    #[serde(
        default,
        with = "super::opt_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_duration: Option<Duration>,
    /// Apply jitter to positions and durations during execution
    #[serde(default)]
    pub randomize: bool,
}

impl DumbScenario {
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dumb_scenario_toml_round_trip() {
        let scenario = DumbScenario {
            id: 7,
            name: "farm".to_string(),
            actions: vec![
                DumbAction::Click {
                    name: "collect".to_string(),
                    position: Point::new(120, 640),
                    press_duration: Duration::from_millis(25),
                    repeat: Repeatable::times(4).with_delay(Duration::from_millis(200)),
                },
                DumbAction::Pause {
                    name: "cooldown".to_string(),
                    duration: Duration::from_secs(2),
                },
            ],
            repeat: Repeatable::infinite(),
            max_duration: Some(Duration::from_secs(3600)),
            randomize: true,
        };

        let text = toml::to_string(&scenario).unwrap();
        let back: DumbScenario = toml::from_str(&text).unwrap();
        assert_eq!(back, scenario);
    }

    #[test]
    fn test_is_valid_requires_name_and_actions() {
        let scenario = DumbScenario {
            id: 1,
            name: String::new(),
            actions: Vec::new(),
            repeat: Repeatable::once(),
            max_duration: None,
            randomize: false,
        };
        assert!(!scenario.is_valid());
    }
}
