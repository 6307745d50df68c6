//! Shared fakes for the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use visiontap::{
    Area, Condition, ConditionPolarity, DetectionResult, DetectorError, DeviceError, DeviceExecutor,
    Frame, FramePoll, FrameSource, GestureStroke, ImageDetector, IntentPayload, Point,
    ProcessingListener, ReferenceImage, DETECTION_QUALITY_MAX, DETECTION_QUALITY_MIN,
};

/// Detector scripted by the first byte of each reference image
pub struct ScriptedDetector {
    matches: HashMap<u8, Point>,
    released: bool,
}

impl ScriptedDetector {
    pub fn new(matches: &[(u8, Point)]) -> Self {
        Self {
            matches: matches.iter().copied().collect(),
            released: false,
        }
    }
}

impl ImageDetector for ScriptedDetector {
    fn set_screen_metrics(
        &mut self,
        _key: &str,
        _frame: &Frame,
        quality_factor: f64,
    ) -> Result<(), DetectorError> {
        if !(DETECTION_QUALITY_MIN..=DETECTION_QUALITY_MAX).contains(&quality_factor) {
            return Err(DetectorError::InvalidQuality(quality_factor));
        }
        Ok(())
    }

    fn setup_detection(&mut self, _frame: &Frame) {}

    fn detect_condition(&mut self, image: &ReferenceImage, _threshold: u8) -> DetectionResult {
        if self.released {
            return DetectionResult::not_found();
        }
        match image.data.first().and_then(|tag| self.matches.get(tag)) {
            Some(&position) => DetectionResult::at(position, 0.95),
            None => DetectionResult::not_found(),
        }
    }

    fn detect_condition_in(
        &mut self,
        image: &ReferenceImage,
        _area: &Area,
        threshold: u8,
    ) -> DetectionResult {
        self.detect_condition(image, threshold)
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Device that records every interaction and always succeeds
#[derive(Default)]
pub struct RecordingDevice {
    pub gestures: Mutex<Vec<GestureStroke>>,
    pub broadcasts: Mutex<Vec<IntentPayload>>,
    pub activities: Mutex<Vec<IntentPayload>>,
}

impl RecordingDevice {
    pub fn gesture_count(&self) -> usize {
        self.gestures.lock().len()
    }
}

impl DeviceExecutor for RecordingDevice {
    fn execute_gesture(&self, stroke: &GestureStroke) -> Result<(), DeviceError> {
        self.gestures.lock().push(stroke.clone());
        Ok(())
    }

    fn execute_start_activity(&self, intent: &IntentPayload) -> Result<(), DeviceError> {
        self.activities.lock().push(intent.clone());
        Ok(())
    }

    fn execute_send_broadcast(&self, intent: &IntentPayload) -> Result<(), DeviceError> {
        self.broadcasts.lock().push(intent.clone());
        Ok(())
    }
}

/// Device rejecting every call
pub struct FailingDevice;

impl DeviceExecutor for FailingDevice {
    fn execute_gesture(&self, _stroke: &GestureStroke) -> Result<(), DeviceError> {
        Err(DeviceError::Rejected("gesture refused".to_string()))
    }

    fn execute_start_activity(&self, _intent: &IntentPayload) -> Result<(), DeviceError> {
        Err(DeviceError::Rejected("activity refused".to_string()))
    }

    fn execute_send_broadcast(&self, _intent: &IntentPayload) -> Result<(), DeviceError> {
        Err(DeviceError::Rejected("broadcast refused".to_string()))
    }
}

/// Yields one frame, then reports nothing new forever
pub struct SingleFrameSource {
    frame: Option<Frame>,
}

impl SingleFrameSource {
    pub fn new(frame: Frame) -> Self {
        Self { frame: Some(frame) }
    }
}

impl FrameSource for SingleFrameSource {
    fn poll(&mut self) -> FramePoll {
        match self.frame.take() {
            Some(frame) => FramePoll::Frame(frame),
            None => FramePoll::Unchanged,
        }
    }
}

/// Yields a fresh copy of the same frame on every pull
pub struct ContinuousFrameSource {
    frame: Frame,
}

impl ContinuousFrameSource {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }
}

impl FrameSource for ContinuousFrameSource {
    fn poll(&mut self) -> FramePoll {
        FramePoll::Frame(self.frame.clone())
    }
}

/// Yields `remaining` frames, then ends
pub struct ExhaustingFrameSource {
    frame: Frame,
    remaining: usize,
}

impl ExhaustingFrameSource {
    pub fn new(frame: Frame, remaining: usize) -> Self {
        Self { frame, remaining }
    }
}

impl FrameSource for ExhaustingFrameSource {
    fn poll(&mut self) -> FramePoll {
        if self.remaining == 0 {
            return FramePoll::Ended;
        }
        self.remaining -= 1;
        FramePoll::Frame(self.frame.clone())
    }
}

/// Listener capturing how the session ended
#[derive(Default)]
pub struct SessionEndRecorder {
    pub ended: Mutex<Option<Option<String>>>,
}

impl ProcessingListener for SessionEndRecorder {
    fn on_session_ended(&self, error: Option<&str>) {
        *self.ended.lock() = Some(error.map(str::to_string));
    }
}

/// A 64x64 black test frame
pub fn test_frame() -> Frame {
    Frame::new(64, 64, vec![0; 64 * 64 * 4])
}

/// A condition whose reference image carries `tag` as its first byte
pub fn tagged_condition(id: i64, tag: u8) -> Condition {
    Condition {
        id,
        image: ReferenceImage::new(8, 8, vec![tag; 8 * 8 * 4]),
        area: None,
        threshold: 4,
        polarity: ConditionPolarity::Present,
    }
}

/// Poll `predicate` every 10 ms until it holds or `timeout` expires
pub fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    predicate()
}

/// Shared device handle for engine tests
pub fn recording_device() -> Arc<RecordingDevice> {
    Arc::new(RecordingDevice::default())
}
