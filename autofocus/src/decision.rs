//! In-focus decision and correction clamping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest stage correction applied in one run, in millimeters.
pub const MAX_CORRECTION_MM: f64 = 0.10;

/// Limit a requested correction to `±MAX_CORRECTION_MM`.
///
/// Large offsets are approached over several runs rather than in one jump.
pub fn clamp_correction(offset_mm: f64) -> f64 {
    offset_mm.clamp(-MAX_CORRECTION_MM, MAX_CORRECTION_MM)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusStatus {
    InFocus,
    OutOfFocus,
    /// No surface point was detected, so focus cannot be judged
    Unverifiable,
}

/// Outcome of comparing the mean surface offset with the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusDecision {
    pub is_in_focus: bool,
    /// Mean surface offset in millimeters; NaN when unverifiable
    pub offset_mm: f64,
}

impl FocusDecision {
    pub fn unverifiable() -> Self {
        Self {
            is_in_focus: false,
            offset_mm: f64::NAN,
        }
    }

    pub fn status(&self) -> FocusStatus {
        if self.offset_mm.is_nan() {
            FocusStatus::Unverifiable
        } else if self.is_in_focus {
            FocusStatus::InFocus
        } else {
            FocusStatus::OutOfFocus
        }
    }

    /// Message telling an operator which way to move z, when a move is due.
    pub fn operator_instruction(&self) -> Option<String> {
        if self.status() != FocusStatus::OutOfFocus {
            return None;
        }
        let direction = if self.offset_mm > 0.0 {
            "decrease"
        } else {
            "increase"
        };
        Some(format!(
            "Out of focus: {direction} stage z by {:.4} mm",
            self.offset_mm.abs()
        ))
    }
}

impl fmt::Display for FocusDecision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status() {
            FocusStatus::InFocus => write!(f, "in focus (offset {:+.4} mm)", self.offset_mm),
            FocusStatus::OutOfFocus => write!(f, "out of focus (offset {:+.4} mm)", self.offset_mm),
            FocusStatus::Unverifiable => write!(f, "unverifiable (no surface detected)"),
        }
    }
}

/// Relative slack on the tolerance boundary, absorbing rounding in the mean.
const BOUNDARY_SLACK: f64 = 1e-9;

/// Decide focus from a mean offset. `|offset| <= acceptable` is in focus;
/// an offset equal to the tolerance up to rounding counts as on the boundary.
pub fn decide(offset_mm: f64, acceptable_range_mm: f64) -> FocusDecision {
    if offset_mm.is_nan() {
        return FocusDecision::unverifiable();
    }
    let slack = BOUNDARY_SLACK * acceptable_range_mm.abs().max(f64::MIN_POSITIVE);
    let limit = acceptable_range_mm + slack;
    FocusDecision {
        is_in_focus: offset_mm.abs() <= limit,
        offset_mm,
    }
}
