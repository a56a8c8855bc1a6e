//! Detector configuration.

use crate::Error;

/// Parameters passed to the hand engine when a [`HandDetector`] is created.
///
/// [`HandDetector`]: super::detector::HandDetector
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Whether full hand detection runs on every frame instead of tracking between frames.
    pub static_image_mode: bool,
    /// Maximum number of hands reported per frame.
    pub max_hands: usize,
    /// Minimum confidence for a detection to count as a hand.
    pub min_detection_confidence: f32,
    /// Minimum confidence for tracking to continue without redetection.
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            max_hands: 2,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl DetectorConfig {
    /// Selects whether full hand detection runs on every frame.
    ///
    /// When `false` (the default), the engine only runs detection when it has lost track of the
    /// hands and otherwise tracks them incrementally, which is faster for video. Set this to
    /// `true` when frames are unrelated still images.
    #[inline]
    pub fn static_image_mode(mut self, static_image_mode: bool) -> Self {
        self.static_image_mode = static_image_mode;
        self
    }

    /// Sets the maximum number of hands to detect (default: 2).
    #[inline]
    pub fn max_hands(mut self, max_hands: usize) -> Self {
        self.max_hands = max_hands;
        self
    }

    /// Sets the minimum confidence (0.0 to 1.0) for a detection to count as a hand.
    #[inline]
    pub fn min_detection_confidence(mut self, confidence: f32) -> Self {
        self.min_detection_confidence = confidence;
        self
    }

    /// Sets the minimum confidence (0.0 to 1.0) for tracking to continue; below it, the engine
    /// falls back to detection on the next frame.
    #[inline]
    pub fn min_tracking_confidence(mut self, confidence: f32) -> Self {
        self.min_tracking_confidence = confidence;
        self
    }

    /// Checks that `max_hands` is non-zero and both confidence thresholds lie in `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_hands == 0 {
            return Err(Error::InvalidConfig("`max_hands` must be at least 1".into()));
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "`{name}` must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}
