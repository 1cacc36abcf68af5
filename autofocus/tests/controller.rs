//! Surface autofocus runs against fake collaborators and a mock stage

mod common;

use approx::assert_abs_diff_eq;
use autofocus::{
    AutofocusConfig, AutofocusError, AutofocusState, FocusStatus, Roi, MAX_CORRECTION_MM,
};
use common::{config, controller, init_logging, stage, FOCUS_PIXEL, NX, NY, STAGE_Z_MM};
use hardware::{MockStage, StageError, StagePosition};
use ndarray::Array2;
use shared::{Length, LengthExt};
use test_helpers::FakeSurfaceDetector;

use AutofocusState::*;

#[test]
fn test_simulated_run_returns_nan_map_of_requested_shape() {
    init_logging();
    let config = AutofocusConfig {
        hardware_enabled: false,
        x_range: (Length::from_millimeters(0.0), Length::from_millimeters(1.0)),
        y_range: (Length::from_millimeters(0.0), Length::from_millimeters(0.5)),
        pixel_size: Length::from_micrometers(3.0),
        ..config()
    };
    let mut controller = controller(config, FakeSurfaceDetector::flat(0.5));
    let mut stage = stage();

    let outcome = controller.run(&mut stage).unwrap();

    assert_eq!(outcome.surface.dim(), (167, 334));
    assert!(outcome.surface.heights_mm().iter().all(|h| h.is_nan()));
    assert_abs_diff_eq!(outcome.surface.y_mm()[2], 0.006, epsilon = 1e-12);
    assert_eq!(outcome.decision.status(), FocusStatus::Unverifiable);
    assert_eq!(outcome.visited_states, vec![Simulated, Done]);

    assert!(controller.scanner().output_dirs().is_empty());
    assert!(controller.reconstructor().requests().is_empty());
    assert_eq!(controller.detector().calls(), 0);
    assert!(stage.moves().is_empty());
}

#[test]
fn test_missing_focus_pixel_is_rejected_before_any_work() {
    init_logging();
    for hardware_enabled in [true, false] {
        let config = AutofocusConfig {
            hardware_enabled,
            focus_position_in_image_zpix: None,
            ..config()
        };
        let mut controller = controller(config, FakeSurfaceDetector::flat(0.05));
        let mut stage = stage();

        assert!(matches!(
            controller.run(&mut stage),
            Err(AutofocusError::MissingFocusPosition)
        ));
        assert!(controller.scanner().output_dirs().is_empty());
        assert!(stage.moves().is_empty());
    }
}

#[test]
fn test_in_focus_does_not_move_stage() {
    init_logging();
    let mut controller = controller(config(), FakeSurfaceDetector::flat(0.004));
    let mut stage = stage();

    let outcome = controller.run(&mut stage).unwrap();

    assert!(outcome.decision.is_in_focus);
    assert_abs_diff_eq!(outcome.decision.offset_mm, 0.004, epsilon = 1e-12);
    assert!(outcome.correction.is_none());
    assert_eq!(
        outcome.visited_states,
        vec![Scanning, Reconstructing, Detecting, Deciding, Done]
    );
    assert!(stage.moves().is_empty());

    let request = controller.reconstructor().requests()[0];
    assert_eq!(request.focus_pixel, FOCUS_PIXEL);
    assert_eq!(request.dispersion_quadratic_term, 1.5e6);
    assert_eq!(outcome.surface.dim(), (NY, NX));
}

#[test]
fn test_offset_on_tolerance_boundary_is_in_focus() {
    init_logging();
    let mut controller = controller(config(), FakeSurfaceDetector::flat(-0.010));
    let mut stage = stage();

    let outcome = controller.run(&mut stage).unwrap();
    assert_eq!(outcome.decision.status(), FocusStatus::InFocus);
    assert!(stage.moves().is_empty());
}

#[test]
fn test_offset_equal_to_any_tolerance_is_in_focus() {
    init_logging();
    for step in 1..=100 {
        let tolerance = step as f64 * 0.001;
        for offset in [tolerance, -tolerance] {
            let config = AutofocusConfig {
                acceptable_range_mm: tolerance,
                ..config()
            };
            let mut controller = controller(config, FakeSurfaceDetector::flat(offset));
            let mut stage = stage();

            let outcome = controller.run(&mut stage).unwrap();

            assert!(
                outcome.decision.is_in_focus,
                "offset {offset} with tolerance {tolerance}"
            );
            assert!(outcome.correction.is_none());
            assert!(stage.moves().is_empty());
        }
    }
}

#[test]
fn test_small_offset_is_corrected_and_map_shifted() {
    init_logging();
    let mut controller = controller(config(), FakeSurfaceDetector::flat(0.04));
    let mut stage = stage();

    let outcome = controller.run(&mut stage).unwrap();

    let correction = outcome.correction.unwrap();
    assert_abs_diff_eq!(correction.requested_mm, 0.04, epsilon = 1e-12);
    assert_abs_diff_eq!(correction.applied_mm, 0.04, epsilon = 1e-12);
    assert_abs_diff_eq!(correction.from_z.as_millimeters(), STAGE_Z_MM, epsilon = 1e-12);
    assert_abs_diff_eq!(stage.current().z.as_millimeters(), STAGE_Z_MM - 0.04, epsilon = 1e-9);
    assert_abs_diff_eq!(outcome.surface.mean_offset(None), 0.0, epsilon = 1e-12);
    assert_eq!(
        outcome.visited_states,
        vec![Scanning, Reconstructing, Detecting, Deciding, Correcting, Done]
    );

    // Only z is commanded
    let target = stage.moves()[0];
    assert!(target.x.is_none() && target.y.is_none());
}

#[test]
fn test_large_offsets_are_clamped_with_sign() {
    init_logging();
    for (offset, expected_z) in [(0.25, STAGE_Z_MM - 0.10), (-0.40, STAGE_Z_MM + 0.10)] {
        let mut controller = controller(config(), FakeSurfaceDetector::flat(offset));
        let mut stage = stage();

        let outcome = controller.run(&mut stage).unwrap();

        let correction = outcome.correction.unwrap();
        assert_abs_diff_eq!(correction.applied_mm.abs(), MAX_CORRECTION_MM, epsilon = 1e-12);
        assert_eq!(correction.applied_mm.signum(), offset.signum());
        assert_abs_diff_eq!(stage.current().z.as_millimeters(), expected_z, epsilon = 1e-9);
        assert_abs_diff_eq!(
            outcome.surface.mean_offset(None),
            offset - correction.applied_mm,
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_without_auto_correct_only_reports() {
    init_logging();
    let config = AutofocusConfig {
        auto_correct: false,
        ..config()
    };
    let mut controller = controller(config, FakeSurfaceDetector::flat(0.05));
    let mut stage = stage();

    let outcome = controller.run(&mut stage).unwrap();

    assert_eq!(outcome.decision.status(), FocusStatus::OutOfFocus);
    assert!(outcome.correction.is_none());
    assert!(stage.moves().is_empty());
    assert!(!outcome.visited_states.contains(&Correcting));
    let instruction = outcome.decision.operator_instruction().unwrap();
    assert!(instruction.contains("decrease"), "{instruction}");
    // Map left as detected
    assert_abs_diff_eq!(outcome.surface.mean_offset(None), 0.05, epsilon = 1e-12);
}

#[test]
fn test_roi_restricts_the_average() {
    init_logging();
    // Left half at the reference, right half 16 um deep
    let mut heights = Array2::<f64>::zeros((NY, NX));
    heights.slice_mut(ndarray::s![.., 2..]).fill(0.016);

    let whole = AutofocusConfig {
        auto_correct: false,
        ..config()
    };
    let outcome = controller(whole.clone(), FakeSurfaceDetector::with_heights(heights.clone()))
        .run(&mut stage())
        .unwrap();
    assert_abs_diff_eq!(outcome.decision.offset_mm, 0.008, epsilon = 1e-12);
    assert!(outcome.decision.is_in_focus);

    // x = 0.5 and 0.75 mm only
    let right = AutofocusConfig {
        roi: Some(Roi::new(0.4, 0.0, 0.4, 1.0).unwrap()),
        ..whole
    };
    let outcome = controller(right, FakeSurfaceDetector::with_heights(heights))
        .run(&mut stage())
        .unwrap();
    assert_abs_diff_eq!(outcome.decision.offset_mm, 0.016, epsilon = 1e-12);
    assert!(!outcome.decision.is_in_focus);
}

#[test]
fn test_undetected_points_are_skipped() {
    init_logging();
    let mut heights = Array2::from_elem((NY, NX), f64::NAN);
    heights[[0, 0]] = 0.02;
    heights[[2, 3]] = 0.04;
    let config = AutofocusConfig {
        auto_correct: false,
        ..config()
    };
    let outcome = controller(config, FakeSurfaceDetector::with_heights(heights))
        .run(&mut stage())
        .unwrap();
    assert_abs_diff_eq!(outcome.decision.offset_mm, 0.03, epsilon = 1e-12);
}

#[test]
fn test_no_detected_surface_is_unverifiable() {
    init_logging();
    let heights = Array2::from_elem((NY, NX), f64::NAN);
    let mut controller = controller(config(), FakeSurfaceDetector::with_heights(heights));
    let mut stage = stage();

    let outcome = controller.run(&mut stage).unwrap();

    assert_eq!(outcome.decision.status(), FocusStatus::Unverifiable);
    assert!(!outcome.decision.is_in_focus);
    assert!(outcome.decision.offset_mm.is_nan());
    assert!(outcome.correction.is_none());
    assert!(stage.moves().is_empty());
    assert_eq!(outcome.final_state(), Some(Done));
}

#[test]
fn test_stage_failure_is_propagated() {
    init_logging();
    let mut controller = controller(config(), FakeSurfaceDetector::flat(0.05));
    let mut stage = stage();
    stage.fail_next_move("z drive fault");

    let result = controller.run(&mut stage);

    assert!(matches!(
        result,
        Err(AutofocusError::Stage(StageError::MotionFailed(_)))
    ));
    assert_abs_diff_eq!(stage.current().z.as_millimeters(), STAGE_Z_MM, epsilon = 1e-12);
}

#[test]
fn test_correction_outside_travel_is_refused() {
    init_logging();
    let mut controller = controller(config(), FakeSurfaceDetector::flat(0.08));
    let mut stage = MockStage::new(StagePosition::from_millimeters(5.0, 5.0, 0.05));

    let result = controller.run(&mut stage);

    assert!(matches!(
        result,
        Err(AutofocusError::Stage(StageError::OutOfTravel { .. }))
    ));
    assert!(stage.moves().is_empty());
}

#[test]
fn test_repeated_runs_converge_on_large_misalignment() {
    init_logging();
    let mut controller = controller(config(), FakeSurfaceDetector::flat(0.35));
    let mut stage = stage();

    let mut runs = 0;
    loop {
        runs += 1;
        assert!(runs <= 10, "did not converge");
        let outcome = controller.run(&mut stage).unwrap();
        match outcome.correction {
            Some(correction) => {
                assert!(correction.applied_mm.abs() <= MAX_CORRECTION_MM + 1e-12);
                // The sample surface follows the stage
                let remaining = controller.detector().offset_mm() - correction.applied_mm;
                controller.detector_mut().set_offset(remaining);
            }
            None => {
                assert!(outcome.decision.is_in_focus);
                break;
            }
        }
    }

    // 0.35 mm takes three clamped moves and one final 0.05 mm move
    assert_eq!(runs, 5);
    assert_eq!(stage.moves().len(), 4);
    assert_abs_diff_eq!(stage.current().z.as_millimeters(), STAGE_Z_MM - 0.35, epsilon = 1e-9);
}
