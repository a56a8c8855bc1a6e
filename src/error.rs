//! Error types.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{hand::landmark::LandmarkIdx, image::PixelFormat};

/// Errors reported by a [`HandEngine`][crate::hand::engine::HandEngine] implementation.
///
/// Engines wrap arbitrary runtimes, so their errors are passed through opaquely.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// The error type of this crate.
///
/// None of these errors are fatal: a caller processing a video stream can skip the offending
/// frame and carry on with the next one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("image has no pixels")]
    EmptyImage,
    #[error("pixel buffer has the wrong size (expected {expected} bytes, got {actual})")]
    BufferSize { expected: usize, actual: usize },
    #[error("unsupported pixel format {0:?} (hand detection requires a color image)")]
    UnsupportedPixelFormat(PixelFormat),
    #[error("invalid image path '{}' (must have one of the supported extensions)", .0.display())]
    UnsupportedPath(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("image codec error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),
    #[error("engine reported {landmarks} landmarks for hand #{hand} (expected 21)")]
    MalformedDetection { hand: usize, landmarks: usize },
    #[error("engine reported a non-finite coordinate for {} of hand #{hand}", .landmark.name())]
    NonFiniteLandmark { hand: usize, landmark: LandmarkIdx },
    #[error("hand engine failed: {0}")]
    Engine(#[source] EngineError),
}
