//! Scenario processing session
//!
//! Owns the session state machine and the frame loop that scans enabled
//! events by priority and fires the first match.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::cancel::CancellationToken;
use crate::capture::{FramePoll, FrameSource};
use crate::config;
use crate::detection::{ConditionEvaluator, ImageDetector};
use crate::device::DeviceExecutor;
use crate::error::EngineError;
use crate::model::Scenario;

use super::executor::ActionExecutor;
use super::metrics::ProcessingListener;
use super::state::ProcessingState;

/// Backoff between pulls when the frame source has nothing new
const FRAME_POLL_BACKOFF: Duration = Duration::from_millis(20);
/// Poll interval while the session is paused
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lifecycle of a processing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session started yet
    Idle,
    /// Scanning frames and executing actions
    Running,
    /// Session alive but not pulling frames
    Paused,
    /// Session ended on request
    Stopped,
    /// Session ended on a platform failure
    Failed(String),
}

/// Smart scenario engine: one processing session at a time
///
/// Processing runs on a dedicated worker thread; the public methods only
/// flip shared flags and never block on frame work, except [`stop`] which
/// joins the worker.
///
/// [`stop`]: ScenarioEngine::stop
pub struct ScenarioEngine {
    state: Arc<Mutex<SessionState>>,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
    listener: Option<Arc<dyn ProcessingListener>>,
}

impl ScenarioEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::Idle)),
            running: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            worker: None,
            listener: None,
        }
    }

    /// Observe timing and lifecycle of the sessions run by this engine
    pub fn with_listener(mut self, listener: Arc<dyn ProcessingListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Start a session for a validated scenario snapshot.
    ///
    /// The scenario is validated again here; an engine never processes an
    /// invalid definition.
    pub fn start(
        &mut self,
        scenario: Scenario,
        detector: Box<dyn ImageDetector>,
        frames: Box<dyn FrameSource>,
        device: Arc<dyn DeviceExecutor>,
    ) -> Result<(), EngineError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(EngineError::AlreadyRunning);
        }
        config::validate_scenario(&scenario)?;

        // Reap a previously finished worker before reusing the engine.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        self.cancel = CancellationToken::new();
        self.paused.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        *self.state.lock() = SessionState::Running;

        let mut evaluator = ConditionEvaluator::new(detector);
        let mut executor = ActionExecutor::new(device, self.cancel.clone());
        if scenario.randomize {
            executor = executor.with_randomization();
        }
        if let Some(ref listener) = self.listener {
            evaluator = evaluator.with_listener(Arc::clone(listener));
            executor = executor.with_listener(Arc::clone(listener));
        }

        let cancel = self.cancel.clone();
        let paused = Arc::clone(&self.paused);
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let listener = self.listener.clone();

        log::info!(
            "Starting processing session for scenario '{}' ({} events)",
            scenario.name,
            scenario.events.len()
        );

        let spawned = thread::Builder::new()
            .name("scenario-processor".to_string())
            .spawn(move || {
                run_session(
                    scenario, evaluator, executor, frames, cancel, paused, state, running,
                    listener,
                );
            });
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(error) => {
                self.running.store(false, Ordering::SeqCst);
                *self.state.lock() = SessionState::Idle;
                Err(error.into())
            }
        }
    }

    /// Suspend frame processing; the session stays alive
    pub fn pause(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Running {
            self.paused.store(true, Ordering::SeqCst);
            *state = SessionState::Paused;
            log::info!("Processing session paused");
        }
    }

    /// Resume a paused session
    pub fn resume(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Paused {
            self.paused.store(false, Ordering::SeqCst);
            *state = SessionState::Running;
            log::info!("Processing session resumed");
        }
    }

    /// Stop the session and wait for the worker to unwind.
    ///
    /// An in-progress device call finishes, but no new action starts once
    /// the stop is observed.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScenarioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The session body running on the worker thread
#[allow(clippy::too_many_arguments)]
fn run_session(
    scenario: Scenario,
    mut evaluator: ConditionEvaluator,
    mut executor: ActionExecutor,
    mut frames: Box<dyn FrameSource>,
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
    running: Arc<AtomicBool>,
    listener: Option<Arc<dyn ProcessingListener>>,
) {
    let mut processing = ProcessingState::for_scenario(&scenario);
    // Scan order is fixed for the whole session.
    let mut ordered: Vec<usize> = (0..scenario.events.len()).collect();
    ordered.sort_by_key(|&index| scenario.events[index].priority);

    let mut metrics_ready = false;

    let failure: Option<String> = 'session: loop {
        if cancel.is_cancelled() {
            break 'session None;
        }
        if paused.load(Ordering::SeqCst) {
            cancel.sleep(PAUSE_POLL_INTERVAL);
            continue;
        }

        let frame = match frames.poll() {
            FramePoll::Frame(frame) => frame,
            FramePoll::Unchanged => {
                cancel.sleep(FRAME_POLL_BACKOFF);
                continue;
            }
            FramePoll::Ended => {
                log::warn!("Frame source ended, stopping session");
                break 'session Some("frame source ended".to_string());
            }
        };

        if !metrics_ready {
            if let Err(error) =
                evaluator.set_screen_metrics(&scenario.name, &frame, scenario.detection_quality)
            {
                log::error!("Detector setup failed: {error}");
                break 'session Some(error.to_string());
            }
            metrics_ready = true;
        }
        executor.set_screen_bounds(frame.bounds());

        for &index in &ordered {
            let event = &scenario.events[index];
            if !processing.is_event_enabled(event.id) {
                continue;
            }

            let results = evaluator.evaluate(event, Some(&frame));
            if !results.fulfilled() {
                continue;
            }

            log::debug!("Event '{}' triggered", event.name);
            if let Err(error) = executor.execute_actions(event, &results, &mut processing) {
                log::error!("Action execution failed for event '{}': {error}", event.name);
                break 'session Some(error.to_string());
            }
            // First match wins for this frame.
            break;
        }

        if let Some(ref listener) = listener {
            listener.on_frame_processed();
        }
    };

    // Teardown: release the detector and drop the session state before
    // reporting the final lifecycle state.
    evaluator.release();
    drop(processing);

    *state.lock() = match failure {
        Some(ref message) => SessionState::Failed(message.clone()),
        None => SessionState::Stopped,
    };
    if let Some(ref listener) = listener {
        listener.on_session_ended(failure.as_deref());
    }
    running.store(false, Ordering::SeqCst);
    log::info!("Processing session for '{}' ended", scenario.name);
}
