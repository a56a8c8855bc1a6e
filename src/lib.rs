//! Hand landmark extraction on top of an external hand pose engine.
//!
//! The engine (anything implementing [`hand::engine::HandEngine`]) finds hands in a frame and
//! reports 21 normalized landmarks per hand. This crate turns those into pixel coordinates,
//! labels each hand as left or right, optionally draws the hand skeleton onto the frame, and
//! measures the frame rate of the caller's loop.
//!
//! ```no_run
//! # use handtrack::{hand::{detector::HandDetector, config::DetectorConfig, engine::HandEngine}, image::Image, timer::FpsEstimator};
//! # fn run<E: HandEngine>(engine: E, frames: impl Iterator<Item = Image>) -> Result<(), handtrack::Error> {
//! let mut detector = HandDetector::new(engine, DetectorConfig::default())?;
//! let mut fps = FpsEstimator::new();
//! for frame in frames {
//!     let mut annotated = detector.find_hands(&frame)?;
//!     for hand in detector.find_positions(&frame) {
//!         log::info!("{} hand, wrist at {:?}", hand.handedness(), hand.wrist().pixel());
//!     }
//!     handtrack::image::draw::fps(&mut annotated, fps.update());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Coordinates
//!
//! Pixel coordinates use the image's coordinate system: X points to the right, Y points *down*,
//! `(0, 0)` is the top left corner. The Z coordinate is whatever relative depth the engine
//! reports (by convention relative to the wrist, smaller values are closer to the camera).
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filters set by [`init_logger!`].

pub mod error;
pub mod hand;
pub mod image;
pub mod resolution;
pub mod timer;


pub use error::{EngineError, Error};

use log::LevelFilter;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this crate will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
