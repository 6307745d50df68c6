//! Session-scoped processing state

use std::collections::HashMap;

use crate::model::{Action, Scenario};

/// Mutable state owned by one processing session
///
/// Seeded at session start with every event id of the scenario (enabled)
/// and every counter name its actions reference (at zero), then discarded
/// at session end. Single owner, no locking: only the active processing
/// path touches it.
#[derive(Debug, Clone, Default)]
pub struct ProcessingState {
    enabled: HashMap<i64, bool>,
    counters: HashMap<String, i64>,
}

impl ProcessingState {
    /// Seed the state for a scenario
    pub fn for_scenario(scenario: &Scenario) -> Self {
        let enabled = scenario.events.iter().map(|event| (event.id, true)).collect();

        let mut counters = HashMap::new();
        for event in &scenario.events {
            for action in &event.actions {
                if let Action::ChangeCounter { counter_name, .. } = action {
                    counters.entry(counter_name.clone()).or_insert(0);
                }
            }
        }

        Self { enabled, counters }
    }

    /// Whether an event currently participates in processing.
    ///
    /// Ids never seeded default to enabled.
    pub fn is_event_enabled(&self, event_id: i64) -> bool {
        self.enabled.get(&event_id).copied().unwrap_or(true)
    }

    pub fn enable_event(&mut self, event_id: i64) {
        self.set_enabled(event_id, true);
    }

    pub fn disable_event(&mut self, event_id: i64) {
        self.set_enabled(event_id, false);
    }

    pub fn toggle_event(&mut self, event_id: i64) {
        if let Some(enabled) = self.enabled.get_mut(&event_id) {
            *enabled = !*enabled;
        } else {
            log::debug!("Toggle on unknown event {event_id} ignored");
        }
    }

    fn set_enabled(&mut self, event_id: i64, value: bool) {
        if let Some(enabled) = self.enabled.get_mut(&event_id) {
            *enabled = value;
        } else {
            log::debug!("Toggle on unknown event {event_id} ignored");
        }
    }

    /// Enable every seeded event
    pub fn enable_all(&mut self) {
        self.enabled.values_mut().for_each(|enabled| *enabled = true);
    }

    /// Disable every seeded event
    pub fn disable_all(&mut self) {
        self.enabled.values_mut().for_each(|enabled| *enabled = false);
    }

    /// Invert every seeded event
    pub fn toggle_all(&mut self) {
        self.enabled.values_mut().for_each(|enabled| *enabled = !*enabled);
    }

    /// Current value of a counter, `None` for names the scenario never
    /// references
    pub fn counter_value(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }

    /// Store a counter value. Pure store: arithmetic is done by the caller.
    pub fn set_counter_value(&mut self, name: &str, value: i64) {
        self.counters.insert(name.to_string(), value);
    }
}
