//! Hand landmark extraction.
//!
//! - [`engine`] defines the [`HandEngine`][engine::HandEngine] trait that the actual hand pose
//!   model is accessed through, and the raw data it returns.
//! - [`normalize`] turns raw engine output into pixel-space [`Hand`][landmark::Hand]s.
//! - [`detector`] contains [`HandDetector`][detector::HandDetector], which ties everything
//!   together.

pub mod config;
pub mod detector;
pub mod engine;
pub mod landmark;
pub mod normalize;
