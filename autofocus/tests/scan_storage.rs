//! Temporary scan folders are removed on every exit path

mod common;

use autofocus::{AutofocusConfig, AutofocusError, SurfaceAutofocusController};
use common::{config, controller, init_logging, stage, NX, NY, PITCH_MM};
use test_helpers::{FakeSurfaceDetector, FakeTileScanner, FakeVolumeReconstructor};

fn config_in(parent: &tempfile::TempDir) -> AutofocusConfig {
    AutofocusConfig {
        temp_dir_parent: Some(parent.path().to_path_buf()),
        ..config()
    }
}

fn is_empty(dir: &tempfile::TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

#[test]
fn test_scan_folder_removed_after_success() {
    init_logging();
    let parent = tempfile::tempdir().unwrap();
    let mut controller = controller(config_in(&parent), FakeSurfaceDetector::flat(0.0));

    controller.run(&mut stage()).unwrap();

    let scanned = &controller.scanner().output_dirs()[0];
    assert!(scanned.starts_with(parent.path()));
    assert!(!scanned.exists());
    assert!(is_empty(&parent));
    // The reconstructor saw both tiles while the folder existed
    assert_eq!(controller.reconstructor().tiles_seen(), &[2]);
}

#[test]
fn test_scan_folder_removed_after_scan_error() {
    init_logging();
    let parent = tempfile::tempdir().unwrap();
    let mut controller = SurfaceAutofocusController::new(
        config_in(&parent),
        FakeTileScanner::new(3).failing("galvo timeout"),
        FakeVolumeReconstructor::new(512, NX, NY, PITCH_MM),
        FakeSurfaceDetector::flat(0.0),
    )
    .unwrap();

    let result = controller.run(&mut stage());

    assert!(matches!(result, Err(AutofocusError::Scan(_))));
    assert!(controller.reconstructor().requests().is_empty());
    assert!(!controller.scanner().output_dirs()[0].exists());
    assert!(is_empty(&parent));
}

#[test]
fn test_scan_folder_removed_after_reconstruction_error() {
    init_logging();
    let parent = tempfile::tempdir().unwrap();
    let mut controller = SurfaceAutofocusController::new(
        config_in(&parent),
        FakeTileScanner::new(2),
        FakeVolumeReconstructor::new(512, NX, NY, PITCH_MM).failing("corrupt tile"),
        FakeSurfaceDetector::flat(0.0),
    )
    .unwrap();

    let result = controller.run(&mut stage());

    match result {
        Err(AutofocusError::Reconstruction(e)) => assert_eq!(e.to_string(), "corrupt tile"),
        other => panic!("expected reconstruction error, got {other:?}"),
    }
    assert_eq!(controller.detector().calls(), 0);
    assert!(is_empty(&parent));
}

#[test]
fn test_scan_folder_removed_after_detection_error() {
    init_logging();
    let parent = tempfile::tempdir().unwrap();
    let mut controller = controller(
        config_in(&parent),
        FakeSurfaceDetector::flat(0.0).failing("no interface"),
    );
    let mut stage = stage();

    let result = controller.run(&mut stage);

    assert!(matches!(result, Err(AutofocusError::Detection(_))));
    assert!(stage.moves().is_empty());
    assert!(is_empty(&parent));
}

#[test]
fn test_missing_parent_folder_fails_before_scanning() {
    init_logging();
    let parent = tempfile::tempdir().unwrap();
    let config = AutofocusConfig {
        temp_dir_parent: Some(parent.path().join("missing")),
        ..config()
    };
    let mut controller = controller(config, FakeSurfaceDetector::flat(0.0));

    assert!(matches!(
        controller.run(&mut stage()),
        Err(AutofocusError::TempStorage(_))
    ));
    assert!(controller.scanner().output_dirs().is_empty());
}
