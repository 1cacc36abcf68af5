//! Common fixtures for autofocus controller tests

use autofocus::{AutofocusConfig, CropPolicy, SurfaceAutofocusController};
use hardware::{MockStage, StagePosition};
use shared::{Length, LengthExt};
use test_helpers::{FakeSurfaceDetector, FakeTileScanner, FakeVolumeReconstructor};

pub type FakeController =
    SurfaceAutofocusController<FakeTileScanner, FakeVolumeReconstructor, FakeSurfaceDetector>;

/// Focus pixel handed to every hardware run
pub const FOCUS_PIXEL: usize = 120;

/// Reconstructed lateral grid: 4 x 3 points at 0.25 mm pitch
pub const NX: usize = 4;
pub const NY: usize = 3;
pub const PITCH_MM: f64 = 0.25;

pub const STAGE_Z_MM: f64 = 6.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> AutofocusConfig {
    AutofocusConfig {
        x_range: (Length::from_millimeters(0.0), Length::from_millimeters(1.0)),
        y_range: (Length::from_millimeters(0.0), Length::from_millimeters(0.75)),
        pixel_size: Length::from_micrometers(250.0),
        focus_position_in_image_zpix: Some(FOCUS_PIXEL),
        dispersion_quadratic_term: 1.5e6,
        crop: CropPolicy::AroundFocus {
            half_height_pix: 40,
        },
        ..Default::default()
    }
}

pub fn controller(config: AutofocusConfig, detector: FakeSurfaceDetector) -> FakeController {
    SurfaceAutofocusController::new(
        config,
        FakeTileScanner::new(2),
        FakeVolumeReconstructor::new(512, NX, NY, PITCH_MM),
        detector,
    )
    .expect("valid test config")
}

pub fn stage() -> MockStage {
    MockStage::new(StagePosition::from_millimeters(5.0, 5.0, STAGE_Z_MM))
}
