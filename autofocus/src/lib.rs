//! Surface autofocus for tissue scanning
//!
//! Keeps the tissue surface at the calibrated focus depth. Each run scans,
//! reconstructs, detects the surface and either reports the mean offset or
//! moves the stage z axis by a safety-clamped amount.
//! Runs: Scanning -> Reconstructing -> Detecting -> Deciding -> [Correcting] -> Done

pub mod config;
pub mod controller;
pub mod decision;
pub mod error;
pub mod pipeline;
pub mod scratch;
pub mod state;
pub mod surface;

pub use config::{AutofocusConfig, CropPolicy, DEFAULT_ACCEPTABLE_RANGE_MM};
pub use controller::{AppliedCorrection, AutofocusOutcome, SurfaceAutofocusController};
pub use decision::{clamp_correction, decide, FocusDecision, FocusStatus, MAX_CORRECTION_MM};
pub use error::{AutofocusError, CollaboratorError};
pub use pipeline::{ReconstructionRequest, SurfaceDetector, VolumeReconstructor};
pub use scratch::ScanScratch;
pub use state::AutofocusState;
pub use surface::{Roi, SurfaceMap};
