//! Dumb scenario repeat engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::cancel::CancellationToken;
use crate::config;
use crate::device::{DeviceExecutor, GestureStroke};
use crate::error::EngineError;
use crate::model::{Area, DumbAction, DumbScenario};
use crate::processing::{jittered_duration, jittered_point, Jitter};

/// Replays a dumb scenario on a dedicated worker thread
///
/// No detection is involved: the action list runs as declared, under the
/// scenario's repeat envelope and optional max duration, until done or
/// stopped.
pub struct DumbEngine {
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl DumbEngine {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            worker: None,
        }
    }

    /// Start replaying `scenario`. `screen_bounds` caps jittered positions
    /// when the scenario randomizes its inputs.
    pub fn start(
        &mut self,
        scenario: DumbScenario,
        device: Arc<dyn DeviceExecutor>,
        screen_bounds: Area,
    ) -> Result<(), EngineError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(EngineError::AlreadyRunning);
        }
        config::validate_dumb_scenario(&scenario)?;

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        self.cancel = CancellationToken::new();
        self.running.store(true, Ordering::SeqCst);

        let cancel = self.cancel.clone();
        let running = Arc::clone(&self.running);

        log::info!(
            "Starting dumb scenario '{}' ({} actions)",
            scenario.name,
            scenario.actions.len()
        );

        let spawned = thread::Builder::new()
            .name("dumb-engine".to_string())
            .spawn(move || {
                run_dumb_scenario(scenario, device, screen_bounds, cancel, running);
            });
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(error) => {
                self.running.store(false, Ordering::SeqCst);
                Err(error.into())
            }
        }
    }

    /// Stop the replay and wait for the worker to unwind
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for DumbEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DumbEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_dumb_scenario(
    scenario: DumbScenario,
    device: Arc<dyn DeviceExecutor>,
    screen_bounds: Area,
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
) {
    let deadline = scenario.max_duration.map(|limit| Instant::now() + limit);
    let mut jitter = scenario.randomize.then(|| Jitter::new(screen_bounds));

    let outcome = scenario.repeat.repeat(&cancel, || {
        for action in &scenario.actions {
            if deadline_reached(deadline) {
                log::info!("Dumb scenario '{}' hit its max duration", scenario.name);
                cancel.cancel();
            }
            if cancel.is_cancelled() {
                return Ok(());
            }
            execute_dumb_action(action, &device, &mut jitter, &cancel, deadline)?;
        }
        Ok(())
    });

    if let Err(error) = outcome {
        log::error!("Dumb scenario '{}' aborted: {error}", scenario.name);
    }
    running.store(false, Ordering::SeqCst);
    log::info!("Dumb scenario '{}' finished", scenario.name);
}

fn execute_dumb_action(
    action: &DumbAction,
    device: &Arc<dyn DeviceExecutor>,
    jitter: &mut Option<Jitter>,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Result<(), EngineError> {
    match action {
        DumbAction::Click {
            position,
            press_duration,
            repeat,
            ..
        } => repeat.repeat(cancel, || {
            if deadline_reached(deadline) {
                cancel.cancel();
                return Ok(());
            }
            let stroke = GestureStroke::tap(
                jittered_point(jitter, *position),
                jittered_duration(jitter, *press_duration),
            );
            device.execute_gesture(&stroke)?;
            Ok(())
        }),
        DumbAction::Swipe {
            from,
            to,
            duration,
            repeat,
            ..
        } => repeat.repeat(cancel, || {
            if deadline_reached(deadline) {
                cancel.cancel();
                return Ok(());
            }
            let stroke = GestureStroke::swipe(
                jittered_point(jitter, *from),
                jittered_point(jitter, *to),
                jittered_duration(jitter, *duration),
            );
            device.execute_gesture(&stroke)?;
            Ok(())
        }),
        DumbAction::Pause { duration, .. } => {
            let mut end = Instant::now() + jittered_duration(jitter, *duration);
            if let Some(deadline) = deadline {
                end = end.min(deadline);
            }
            cancel.sleep_until(end);
            Ok(())
        }
    }
}

fn deadline_reached(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}
