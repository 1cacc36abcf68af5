//! Three-axis translation stage carrying the sample.
//!
//! Positions are reported and commanded in physical lengths. A move may set
//! any subset of axes; axes left as `None` in a [`StageTarget`] keep their
//! current position.

pub mod mock;

use std::fmt;

use serde::{Deserialize, Serialize};
use shared::{Length, LengthExt};
use thiserror::Error;

pub use mock::MockStage;

/// Full travel of the motorized stage, in millimeters.
pub const DEFAULT_TRAVEL_MIN_MM: f64 = 0.0;
pub const DEFAULT_TRAVEL_MAX_MM: f64 = 13.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageAxis {
    X,
    Y,
    Z,
}

impl StageAxis {
    pub const ALL: [StageAxis; 3] = [StageAxis::X, StageAxis::Y, StageAxis::Z];
}

impl fmt::Display for StageAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageAxis::X => write!(f, "x"),
            StageAxis::Y => write!(f, "y"),
            StageAxis::Z => write!(f, "z"),
        }
    }
}

/// Errors reported by a stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// Requested position lies outside the travel range
    #[error("{axis} target {requested_mm:.4} mm outside travel [{min_mm}, {max_mm}] mm")]
    OutOfTravel {
        axis: StageAxis,
        requested_mm: f64,
        min_mm: f64,
        max_mm: f64,
    },

    /// Controller reported a failed or incomplete move
    #[error("motion failed: {0}")]
    MotionFailed(String),

    /// Stage has not been homed or connected
    #[error("stage not initialized")]
    NotInitialized,
}

pub type StageResult<T> = Result<T, StageError>;

/// Current position on all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagePosition {
    pub x: Length,
    pub y: Length,
    pub z: Length,
}

impl StagePosition {
    pub fn from_millimeters(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Length::from_millimeters(x),
            y: Length::from_millimeters(y),
            z: Length::from_millimeters(z),
        }
    }

    pub fn get(&self, axis: StageAxis) -> Length {
        match axis {
            StageAxis::X => self.x,
            StageAxis::Y => self.y,
            StageAxis::Z => self.z,
        }
    }

    /// Position after applying `target`, leaving unset axes unchanged.
    pub fn apply(&self, target: &StageTarget) -> Self {
        Self {
            x: target.x.unwrap_or(self.x),
            y: target.y.unwrap_or(self.y),
            z: target.z.unwrap_or(self.z),
        }
    }
}

impl fmt::Display for StagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4}) mm",
            self.x.as_millimeters(),
            self.y.as_millimeters(),
            self.z.as_millimeters()
        )
    }
}

/// Commanded position; `None` leaves an axis where it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTarget {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub z: Option<Length>,
}

impl StageTarget {
    /// Move only the depth axis.
    pub fn z(z: Length) -> Self {
        Self {
            z: Some(z),
            ..Default::default()
        }
    }

    pub fn get(&self, axis: StageAxis) -> Option<Length> {
        match axis {
            StageAxis::X => self.x,
            StageAxis::Y => self.y,
            StageAxis::Z => self.z,
        }
    }
}

/// Travel range shared by all axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTravel {
    pub min: Length,
    pub max: Length,
}

impl Default for StageTravel {
    fn default() -> Self {
        Self {
            min: Length::from_millimeters(DEFAULT_TRAVEL_MIN_MM),
            max: Length::from_millimeters(DEFAULT_TRAVEL_MAX_MM),
        }
    }
}

impl StageTravel {
    pub fn contains(&self, value: Length) -> bool {
        value >= self.min && value <= self.max
    }

    /// Reject any axis of `target` that falls outside the travel range.
    pub fn check(&self, target: &StageTarget) -> StageResult<()> {
        for axis in StageAxis::ALL {
            if let Some(value) = target.get(axis) {
                if !self.contains(value) {
                    return Err(StageError::OutOfTravel {
                        axis,
                        requested_mm: value.as_millimeters(),
                        min_mm: self.min.as_millimeters(),
                        max_mm: self.max.as_millimeters(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Motorized stage interface.
///
/// Moves are blocking: `set_position` returns once the stage has settled.
pub trait Stage {
    /// Query the current position.
    fn position(&mut self) -> StageResult<StagePosition>;

    /// Move to `target` and return the settled position.
    fn set_position(&mut self, target: StageTarget) -> StageResult<StagePosition>;

    /// Travel limits of this stage.
    fn travel(&self) -> StageTravel {
        StageTravel::default()
    }
}
