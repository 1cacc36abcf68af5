use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a single autofocus run.
///
/// A hardware run visits `Scanning → Reconstructing → Detecting → Deciding`,
/// then `Correcting` only when out of focus with auto-correct enabled, and
/// always ends in `Done`. A simulated run goes straight from `Simulated` to
/// `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutofocusState {
    /// Hardware disabled, no acquisition performed
    Simulated,
    /// Tiled scan into the temporary directory
    Scanning,
    /// Volume reconstruction around the focus pixel
    Reconstructing,
    /// Surface detection on the reconstructed volume
    Detecting,
    /// Mean offset compared with the acceptable range
    Deciding,
    /// Stage z moved by the clamped correction
    Correcting,
    /// Run finished
    Done,
}

impl fmt::Display for AutofocusState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AutofocusState::Simulated => "Simulated",
            AutofocusState::Scanning => "Scanning",
            AutofocusState::Reconstructing => "Reconstructing",
            AutofocusState::Detecting => "Detecting",
            AutofocusState::Deciding => "Deciding",
            AutofocusState::Correcting => "Correcting",
            AutofocusState::Done => "Done",
        };
        write!(f, "{name}")
    }
}
