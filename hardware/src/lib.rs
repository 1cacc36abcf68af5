//! Hardware contracts for the scanning system.
//!
//! The calibration and autofocus crates drive the instrument only through
//! the traits defined here, so they run unchanged against real drivers,
//! [`MockStage`], or the synthetic scanners in `test_helpers`.

pub mod scanner;
pub mod stage;

pub use scanner::{ScanError, ScanMetadata, SpectralScanner, TileScanRequest, TileScanner};
pub use stage::{
    MockStage, Stage, StageAxis, StageError, StagePosition, StageResult, StageTarget, StageTravel,
};
