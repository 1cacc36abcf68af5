//! Test helpers for the OCT workspace
//!
//! Synthetic instruments and collaborator fakes shared by the integration
//! tests of the calibration and autofocus crates.

pub mod fakes;
pub mod glass_slide;

pub use fakes::{FakeFailure, FakeSurfaceDetector, FakeTileScanner, FakeVolumeReconstructor};
pub use glass_slide::GlassSlideScanner;
