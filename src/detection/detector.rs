//! Image detector contract

use crate::capture::Frame;
use crate::error::DetectorError;
use crate::model::{Area, Point, ReferenceImage};

/// Lowest accepted detection quality factor
pub const DETECTION_QUALITY_MIN: f64 = 400.0;
/// Highest accepted detection quality factor
pub const DETECTION_QUALITY_MAX: f64 = 3216.0;

/// Result of one detection call
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Whether the reference image was found at a qualifying confidence
    pub matched: bool,
    /// Center of the match; meaningless when `matched` is false
    pub position: Point,
    pub confidence: f64,
}

impl DetectionResult {
    pub fn not_found() -> Self {
        Self {
            matched: false,
            position: Point::new(0, 0),
            confidence: 0.0,
        }
    }

    pub fn at(position: Point, confidence: f64) -> Self {
        Self {
            matched: true,
            position,
            confidence,
        }
    }
}

/// Opaque pattern-matching capability
///
/// The engine acquires a detector before a session, feeds it frames, and
/// releases it at session end. After `release`, detection calls must return
/// [`DetectionResult::not_found`] and never fail.
pub trait ImageDetector: Send {
    /// Declare the screen geometry and quality factor for this session.
    ///
    /// Fails with [`DetectorError::InvalidQuality`] when `quality_factor` is
    /// outside `[DETECTION_QUALITY_MIN, DETECTION_QUALITY_MAX]`.
    fn set_screen_metrics(
        &mut self,
        key: &str,
        frame: &Frame,
        quality_factor: f64,
    ) -> Result<(), DetectorError>;

    /// Provide the frame the next detection calls run against
    fn setup_detection(&mut self, frame: &Frame);

    /// Search the whole current frame for the reference image
    fn detect_condition(&mut self, image: &ReferenceImage, threshold: u8) -> DetectionResult;

    /// Search only `area` of the current frame for the reference image
    fn detect_condition_in(
        &mut self,
        image: &ReferenceImage,
        area: &Area,
        threshold: u8,
    ) -> DetectionResult;

    /// Release underlying resources; the detector stays callable but inert
    fn release(&mut self);
}
