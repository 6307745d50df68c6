//! Action execution for triggered events

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cancel::CancellationToken;
use crate::detection::ConditionsResult;
use crate::device::{DeviceExecutor, GestureStroke, IntentPayload};
use crate::error::EngineError;
use crate::model::{
    Action, Area, ClickPosition, ConditionOperator, CounterOperation, Event, Point, Repeatable,
    ToggleTarget, ToggleType,
};

use super::metrics::ProcessingListener;
use super::state::ProcessingState;

/// Settle delay after starting an activity, to avoid overwhelming the
/// environment under tight loops
const INTENT_START_ACTIVITY_SETTLE: Duration = Duration::from_millis(1000);
/// Settle delay after a broadcast
const INTENT_BROADCAST_SETTLE: Duration = Duration::from_millis(100);

/// Largest signed offset jitter adds to a position, in pixels
pub const POSITION_MAX_OFFSET_PX: i32 = 5;
/// Largest signed offset jitter adds to a duration, in milliseconds
pub const DURATION_MAX_OFFSET_MS: i64 = 5;

/// Bounded random perturbation of positions and durations
///
/// Offsets are additive deltas drawn uniformly around the nominal value.
/// A jittered duration never drops below one millisecond and a jittered
/// position never leaves the screen bounds.
pub struct Jitter {
    bounds: Area,
    rng: StdRng,
}

impl Jitter {
    pub fn new(bounds: Area) -> Self {
        Self {
            bounds,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn set_bounds(&mut self, bounds: Area) {
        self.bounds = bounds;
    }

    pub fn point(&mut self, nominal: Point) -> Point {
        let offset_x = self.rng.gen_range(-POSITION_MAX_OFFSET_PX..=POSITION_MAX_OFFSET_PX);
        let offset_y = self.rng.gen_range(-POSITION_MAX_OFFSET_PX..=POSITION_MAX_OFFSET_PX);
        self.bounds
            .clamp_point(Point::new(nominal.x + offset_x, nominal.y + offset_y))
    }

    pub fn duration(&mut self, nominal: Duration) -> Duration {
        let offset = self.rng.gen_range(-DURATION_MAX_OFFSET_MS..=DURATION_MAX_OFFSET_MS);
        let millis = nominal.as_millis() as i64 + offset;
        Duration::from_millis(millis.max(1) as u64)
    }
}

pub(crate) fn jittered_point(jitter: &mut Option<Jitter>, nominal: Point) -> Point {
    match jitter.as_mut() {
        Some(jitter) => jitter.point(nominal),
        None => nominal,
    }
}

pub(crate) fn jittered_duration(jitter: &mut Option<Jitter>, nominal: Duration) -> Duration {
    match jitter.as_mut() {
        Some(jitter) => jitter.duration(nominal),
        None => nominal,
    }
}

/// Executes the actions of a triggered event, strictly in declared order
///
/// An action that fails to resolve is skipped; a rejected device call is
/// returned and ends the session. Cancellation is checked before every
/// action and between repeat iterations.
pub struct ActionExecutor {
    device: Arc<dyn DeviceExecutor>,
    cancel: CancellationToken,
    randomize: bool,
    jitter: Option<Jitter>,
    listener: Option<Arc<dyn ProcessingListener>>,
}

impl ActionExecutor {
    pub fn new(device: Arc<dyn DeviceExecutor>, cancel: CancellationToken) -> Self {
        Self {
            device,
            cancel,
            randomize: false,
            jitter: None,
            listener: None,
        }
    }

    /// Jitter positions and durations on every dispatched input
    pub fn with_randomization(mut self) -> Self {
        self.randomize = true;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProcessingListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Declare the area jittered positions must stay inside
    pub fn set_screen_bounds(&mut self, bounds: Area) {
        if !self.randomize {
            return;
        }
        match self.jitter.as_mut() {
            Some(jitter) => jitter.set_bounds(bounds),
            None => self.jitter = Some(Jitter::new(bounds)),
        }
    }

    /// Run `event.actions` in order against the evaluation results
    pub fn execute_actions(
        &mut self,
        event: &Event,
        results: &ConditionsResult,
        state: &mut ProcessingState,
    ) -> Result<(), EngineError> {
        let started = Instant::now();

        for action in &event.actions {
            if self.cancel.is_cancelled() {
                break;
            }
            match action {
                Action::Click {
                    position,
                    press_duration,
                    repeat,
                } => self.execute_click(event, position, *press_duration, repeat, results)?,
                Action::Swipe {
                    from,
                    to,
                    duration,
                    repeat,
                } => self.execute_swipe(*from, *to, *duration, repeat)?,
                Action::Pause { duration } => self.execute_pause(*duration),
                Action::Intent {
                    action,
                    flags,
                    component,
                    extras,
                    is_broadcast,
                } => self.execute_intent(action, *flags, component, extras, *is_broadcast)?,
                Action::ToggleEvent { target } => execute_toggle_event(target, state),
                Action::ChangeCounter {
                    counter_name,
                    operation,
                    value,
                } => execute_change_counter(counter_name, *operation, *value, state),
            }
        }

        if let Some(ref listener) = self.listener {
            listener.on_actions_executed(event.id, started.elapsed());
        }
        Ok(())
    }

    fn execute_click(
        &mut self,
        event: &Event,
        position: &ClickPosition,
        press_duration: Duration,
        repeat: &Repeatable,
        results: &ConditionsResult,
    ) -> Result<(), EngineError> {
        let Some(target) = resolve_click_target(event, position, results) else {
            log::warn!(
                "Click of event '{}' has no resolvable target, skipping",
                event.name
            );
            return Ok(());
        };

        let cancel = self.cancel.clone();
        let device = Arc::clone(&self.device);
        let jitter = &mut self.jitter;
        repeat.repeat(&cancel, || {
            let point = jittered_point(jitter, target);
            let duration = jittered_duration(jitter, press_duration);
            device.execute_gesture(&GestureStroke::tap(point, duration))?;
            Ok(())
        })
    }

    fn execute_swipe(
        &mut self,
        from: Point,
        to: Point,
        duration: Duration,
        repeat: &Repeatable,
    ) -> Result<(), EngineError> {
        let cancel = self.cancel.clone();
        let device = Arc::clone(&self.device);
        let jitter = &mut self.jitter;
        repeat.repeat(&cancel, || {
            let stroke = GestureStroke::swipe(
                jittered_point(jitter, from),
                jittered_point(jitter, to),
                jittered_duration(jitter, duration),
            );
            device.execute_gesture(&stroke)?;
            Ok(())
        })
    }

    fn execute_pause(&mut self, duration: Duration) {
        let duration = jittered_duration(&mut self.jitter, duration);
        self.cancel.sleep(duration);
    }

    fn execute_intent(
        &mut self,
        action: &str,
        flags: u32,
        component: &Option<String>,
        extras: &[(String, crate::model::ExtraValue)],
        is_broadcast: bool,
    ) -> Result<(), EngineError> {
        let payload = IntentPayload {
            action: action.to_string(),
            flags,
            component: component.clone(),
            extras: extras.to_vec(),
        };

        if is_broadcast {
            self.device.execute_send_broadcast(&payload)?;
            self.cancel.sleep(INTENT_BROADCAST_SETTLE);
        } else {
            self.device.execute_start_activity(&payload)?;
            self.cancel.sleep(INTENT_START_ACTIVITY_SETTLE);
        }
        Ok(())
    }
}

/// Resolve where a click lands, `None` when it cannot be executed
fn resolve_click_target(
    event: &Event,
    position: &ClickPosition,
    results: &ConditionsResult,
) -> Option<Point> {
    match position {
        ClickPosition::Fixed(point) => Some(*point),
        ClickPosition::OnCondition {
            condition_id: Some(id),
        } => results.condition_result(*id)?.position,
        ClickPosition::OnCondition { condition_id: None } => {
            if event.operator == ConditionOperator::Or {
                results.first_detected()?.position
            } else {
                None
            }
        }
    }
}

fn execute_toggle_event(target: &ToggleTarget, state: &mut ProcessingState) {
    match target {
        ToggleTarget::All(toggle_type) => match toggle_type {
            ToggleType::Enable => state.enable_all(),
            ToggleType::Disable => state.disable_all(),
            ToggleType::Toggle => state.toggle_all(),
        },
        ToggleTarget::Targets(toggles) => {
            for toggle in toggles {
                match toggle.toggle_type {
                    ToggleType::Enable => state.enable_event(toggle.target_event_id),
                    ToggleType::Disable => state.disable_event(toggle.target_event_id),
                    ToggleType::Toggle => state.toggle_event(toggle.target_event_id),
                }
            }
        }
    }
}

fn execute_change_counter(
    name: &str,
    operation: CounterOperation,
    value: i64,
    state: &mut ProcessingState,
) {
    let Some(current) = state.counter_value(name) else {
        log::warn!("Counter '{name}' is unknown, skipping");
        return;
    };

    let next = match operation {
        CounterOperation::Add => current + value,
        CounterOperation::Minus => current - value,
        CounterOperation::Set => value,
    };
    state.set_counter_value(name, next);
}
