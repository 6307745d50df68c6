//! Condition evaluation against captured frames

use std::sync::Arc;
use std::time::Instant;

use crate::capture::Frame;
use crate::error::DetectorError;
use crate::model::{ConditionOperator, ConditionPolarity, Event, Point};
use crate::processing::ProcessingListener;

use super::detector::ImageDetector;

/// Outcome of one condition of an evaluated event
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionResult {
    pub condition_id: i64,
    /// The adjusted outcome: detector match combined with the polarity
    pub fulfilled: bool,
    /// Match center, present only on an actual detector match
    pub position: Option<Point>,
    pub confidence: f64,
}

/// Per-frame evaluation outcome for one event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionsResult {
    fulfilled: bool,
    results: Vec<ConditionResult>,
    /// Index of the first satisfying condition that carries a match position
    first_match: Option<usize>,
}

impl ConditionsResult {
    /// Result for an event that could not be evaluated at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aggregate outcome under the event's operator
    pub fn fulfilled(&self) -> bool {
        self.fulfilled
    }

    pub fn results(&self) -> &[ConditionResult] {
        &self.results
    }

    /// First satisfying condition with an actual match position
    pub fn first_detected(&self) -> Option<&ConditionResult> {
        self.first_match.map(|index| &self.results[index])
    }

    /// Outcome of a specific condition, when it was evaluated
    pub fn condition_result(&self, condition_id: i64) -> Option<&ConditionResult> {
        self.results
            .iter()
            .find(|result| result.condition_id == condition_id)
    }
}

/// Evaluates an event's conditions through the detector capability
///
/// Owns the detector for the whole session; `release` must be called before
/// the session tears down.
pub struct ConditionEvaluator {
    detector: Box<dyn ImageDetector>,
    listener: Option<Arc<dyn ProcessingListener>>,
}

impl ConditionEvaluator {
    pub fn new(detector: Box<dyn ImageDetector>) -> Self {
        Self {
            detector,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProcessingListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Forward the session screen metrics to the detector
    pub fn set_screen_metrics(
        &mut self,
        key: &str,
        frame: &Frame,
        quality_factor: f64,
    ) -> Result<(), DetectorError> {
        self.detector.set_screen_metrics(key, frame, quality_factor)
    }

    /// Evaluate every condition of `event` against `frame`.
    ///
    /// `None` frame yields an empty unfulfilled result, never an error. OR
    /// events short-circuit on the first satisfied condition but record its
    /// identity and position for click resolution.
    pub fn evaluate(&mut self, event: &Event, frame: Option<&Frame>) -> ConditionsResult {
        let started = Instant::now();
        let result = self.evaluate_conditions(event, frame);
        if let Some(ref listener) = self.listener {
            listener.on_event_evaluated(event.id, started.elapsed(), result.fulfilled);
        }
        result
    }

    fn evaluate_conditions(&mut self, event: &Event, frame: Option<&Frame>) -> ConditionsResult {
        let Some(frame) = frame else {
            return ConditionsResult::empty();
        };
        self.detector.setup_detection(frame);

        let mut results = Vec::with_capacity(event.conditions.len());
        let mut first_match = None;
        let mut satisfied = 0usize;

        for condition in &event.conditions {
            let detection = match condition.area {
                Some(ref area) => {
                    self.detector
                        .detect_condition_in(&condition.image, area, condition.threshold)
                }
                None => self
                    .detector
                    .detect_condition(&condition.image, condition.threshold),
            };

            let fulfilled = match condition.polarity {
                ConditionPolarity::Present => detection.matched,
                ConditionPolarity::Absent => !detection.matched,
            };
            let position = detection.matched.then_some(detection.position);

            if fulfilled {
                satisfied += 1;
                if first_match.is_none() && position.is_some() {
                    first_match = Some(results.len());
                }
            }
            results.push(ConditionResult {
                condition_id: condition.id,
                fulfilled,
                position,
                confidence: detection.confidence,
            });

            if fulfilled && event.operator == ConditionOperator::Or {
                break;
            }
        }

        let fulfilled = match event.operator {
            ConditionOperator::And => satisfied == event.conditions.len(),
            ConditionOperator::Or => satisfied > 0,
        };

        ConditionsResult {
            fulfilled,
            results,
            first_match,
        }
    }

    /// Release the underlying detector
    pub fn release(&mut self) {
        self.detector.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionResult;
    use crate::model::{Area, Condition, ReferenceImage};
    use std::collections::HashMap;

    /// Detector scripted by the first byte of each reference image
    struct ScriptedDetector {
        matches: HashMap<u8, Point>,
        released: bool,
    }

    impl ScriptedDetector {
        fn new(matches: &[(u8, Point)]) -> Self {
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
            _quality_factor: f64,
        ) -> Result<(), DetectorError> {
            Ok(())
        }

        fn setup_detection(&mut self, _frame: &Frame) {}

        fn detect_condition(&mut self, image: &ReferenceImage, _threshold: u8) -> DetectionResult {
            if self.released {
                return DetectionResult::not_found();
            }
            match image.data.first().and_then(|tag| self.matches.get(tag)) {
                Some(&position) => DetectionResult::at(position, 0.97),
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

    fn condition(id: i64, tag: u8, polarity: ConditionPolarity) -> Condition {
        Condition {
            id,
            image: ReferenceImage::new(8, 8, vec![tag; 8 * 8 * 4]),
            area: None,
            threshold: 4,
            polarity,
        }
    }

    fn event(operator: ConditionOperator, conditions: Vec<Condition>) -> Event {
        Event {
            id: 1,
            name: "test".to_string(),
            priority: 0,
            operator,
            conditions,
            actions: Vec::new(),
        }
    }

    fn frame() -> Frame {
        Frame::new(64, 64, vec![0; 64 * 64 * 4])
    }

    #[test]
    fn test_and_requires_every_condition() {
        let mut evaluator = ConditionEvaluator::new(Box::new(ScriptedDetector::new(&[(
            1,
            Point::new(10, 10),
        )])));
        let both = event(
            ConditionOperator::And,
            vec![
                condition(1, 1, ConditionPolarity::Present),
                condition(2, 2, ConditionPolarity::Present),
            ],
        );
        assert!(!evaluator.evaluate(&both, Some(&frame())).fulfilled());

        let mut evaluator = ConditionEvaluator::new(Box::new(ScriptedDetector::new(&[
            (1, Point::new(10, 10)),
            (2, Point::new(20, 20)),
        ])));
        assert!(evaluator.evaluate(&both, Some(&frame())).fulfilled());
    }

    #[test]
    fn test_or_requires_at_least_one() {
        let mut evaluator = ConditionEvaluator::new(Box::new(ScriptedDetector::new(&[(
            2,
            Point::new(40, 60),
        )])));
        let either = event(
            ConditionOperator::Or,
            vec![
                condition(1, 1, ConditionPolarity::Present),
                condition(2, 2, ConditionPolarity::Present),
            ],
        );

        let result = evaluator.evaluate(&either, Some(&frame()));
        assert!(result.fulfilled());

        let first = result.first_detected().expect("first match recorded");
        assert_eq!(first.condition_id, 2);
        assert_eq!(first.position, Some(Point::new(40, 60)));
    }

    #[test]
    fn test_absent_polarity_succeeds_on_non_match() {
        let mut evaluator = ConditionEvaluator::new(Box::new(ScriptedDetector::new(&[])));
        let gone = event(
            ConditionOperator::And,
            vec![condition(1, 9, ConditionPolarity::Absent)],
        );

        let result = evaluator.evaluate(&gone, Some(&frame()));
        assert!(result.fulfilled());
        // Satisfied without a detector match: no position to click on.
        assert!(result.first_detected().is_none());
        assert_eq!(result.condition_result(1).unwrap().position, None);
    }

    #[test]
    fn test_missing_frame_yields_empty_result() {
        let mut evaluator = ConditionEvaluator::new(Box::new(ScriptedDetector::new(&[(
            1,
            Point::new(10, 10),
        )])));
        let any = event(
            ConditionOperator::Or,
            vec![condition(1, 1, ConditionPolarity::Present)],
        );

        let result = evaluator.evaluate(&any, None);
        assert!(!result.fulfilled());
        assert!(result.results().is_empty());
    }

    #[test]
    fn test_released_detector_stops_matching() {
        let mut evaluator = ConditionEvaluator::new(Box::new(ScriptedDetector::new(&[(
            1,
            Point::new(10, 10),
        )])));
        let any = event(
            ConditionOperator::Or,
            vec![condition(1, 1, ConditionPolarity::Present)],
        );

        assert!(evaluator.evaluate(&any, Some(&frame())).fulfilled());
        evaluator.release();
        assert!(!evaluator.evaluate(&any, Some(&frame())).fulfilled());
    }
}
