//! Interface to the external hand pose engine.
//!
//! The engine is the neural network (or whatever else) that actually finds hands. It is not part
//! of this crate: implement [`HandEngine`] for a wrapper around your runtime of choice and pass it
//! to [`HandDetector::new`][super::detector::HandDetector::new].

use crate::{error::EngineError, image::RgbImage};

use super::{config::DetectorConfig, landmark::Handedness};

/// A landmark as reported by the engine, in normalized image coordinates.
///
/// `x` and `y` are fractions of the image width and height, `(0, 0)` being the top left corner.
/// Landmarks outside of the visible image have coordinates outside of `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawLandmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist. Smaller values are closer to the camera.
    pub z: f32,
}

impl RawLandmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns whether all three coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A single hand found by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHand {
    /// The hand's landmarks, in [`LandmarkIdx`][super::landmark::LandmarkIdx] order.
    ///
    /// A well-behaved engine always reports exactly 21 of them.
    pub landmarks: Vec<RawLandmark>,
    /// The engine's left/right classification, if it performs one.
    pub handedness: Option<Handedness>,
    /// Detection confidence between 0.0 and 1.0.
    pub score: f32,
}

impl RawHand {
    pub fn new(landmarks: Vec<RawLandmark>, handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness: Some(handedness),
            score: 1.0,
        }
    }

    pub fn with_score(self, score: f32) -> Self {
        Self { score, ..self }
    }

    /// Returns the classified handedness, assuming a right hand if the engine didn't classify it.
    pub fn handedness_or_default(&self) -> Handedness {
        self.handedness.unwrap_or(Handedness::Right)
    }
}

/// Trait for hand pose engines.
///
/// Engines are stateful: in tracking mode (see [`DetectorConfig::static_image_mode`]) they are
/// expected to reuse the hand locations from the previous call and only run full palm detection
/// when tracking is lost.
pub trait HandEngine: Send {
    /// Applies the detector configuration.
    ///
    /// Called once by [`HandDetector::new`][super::detector::HandDetector::new], after the
    /// configuration has been validated. The default implementation ignores the configuration.
    fn configure(&mut self, config: &DetectorConfig) -> Result<(), EngineError> {
        let _ = config;
        Ok(())
    }

    /// Finds hands in an RGB frame.
    ///
    /// Returns an empty list if there are no hands in the frame.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<RawHand>, EngineError>;
}

impl<E: HandEngine + ?Sized> HandEngine for Box<E> {
    fn configure(&mut self, config: &DetectorConfig) -> Result<(), EngineError> {
        (**self).configure(config)
    }

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<RawHand>, EngineError> {
        (**self).detect(frame)
    }
}
