//! Unit-tagged axis descriptors bound to reconstructed arrays.
//!
//! Every interferogram and every depth scan travels together with a
//! [`Dimensions`] set describing the physical position of each sample along
//! each array axis. The axis lengths must always match the array shape; the
//! `check_*` methods enforce that at the boundaries of each operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Physical unit attached to an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisUnit {
    Pixels,
    Micrometers,
    Millimeters,
    Nanometers,
}

impl fmt::Display for AxisUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            AxisUnit::Pixels => "pix",
            AxisUnit::Micrometers => "um",
            AxisUnit::Millimeters => "mm",
            AxisUnit::Nanometers => "nm",
        };
        write!(f, "{label}")
    }
}

/// Errors raised when an array and its dimension-set disagree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimensionError {
    #[error("axis '{axis}' has {axis_len} samples but array dimension is {array_len}")]
    LengthMismatch {
        axis: &'static str,
        axis_len: usize,
        array_len: usize,
    },
    #[error("dimension set has no '{0}' axis")]
    MissingAxis(&'static str),
    #[error("axis '{axis}' expected unit {expected}, found {found}")]
    UnitMismatch {
        axis: &'static str,
        expected: AxisUnit,
        found: AxisUnit,
    },
}

/// Sample positions along one array axis, with their unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDescriptor {
    values: Vec<f64>,
    unit: AxisUnit,
}

impl AxisDescriptor {
    pub fn new(values: Vec<f64>, unit: AxisUnit) -> Self {
        Self { values, unit }
    }

    /// Axis of plain indices `0..len`.
    pub fn pixels(len: usize) -> Self {
        Self::uniform(0.0, 1.0, len, AxisUnit::Pixels)
    }

    /// Evenly spaced axis `start + i * step` for `i in 0..len`.
    pub fn uniform(start: f64, step: f64, len: usize, unit: AxisUnit) -> Self {
        let values = (0..len).map(|i| start + i as f64 * step).collect();
        Self { values, unit }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn unit(&self) -> AxisUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Spacing between the first two samples, `None` for axes shorter than 2.
    pub fn step(&self) -> Option<f64> {
        match self.values.as_slice() {
            [a, b, ..] => Some(b - a),
            _ => None,
        }
    }

    /// Smallest and largest sample value.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    fn check_len(&self, axis: &'static str, array_len: usize) -> Result<(), DimensionError> {
        if self.len() != array_len {
            return Err(DimensionError::LengthMismatch {
                axis,
                axis_len: self.len(),
                array_len,
            });
        }
        Ok(())
    }
}

/// The dimension-set `{lambda, z, x, y}` bound to an interferogram or depth scan.
///
/// Spectral arrays carry `lambda`, depth arrays carry `z`; both carry the
/// lateral axes. Array layout is always `[spectral_or_depth, x, y]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub lambda: Option<AxisDescriptor>,
    pub z: Option<AxisDescriptor>,
    pub x: AxisDescriptor,
    pub y: AxisDescriptor,
}

impl Dimensions {
    /// Dimension-set for a raw interferogram.
    pub fn spectral(lambda: AxisDescriptor, x: AxisDescriptor, y: AxisDescriptor) -> Self {
        Self {
            lambda: Some(lambda),
            z: None,
            x,
            y,
        }
    }

    /// Dimension-set for a depth-resolved scan.
    pub fn depth(z: AxisDescriptor, x: AxisDescriptor, y: AxisDescriptor) -> Self {
        Self {
            lambda: None,
            z: Some(z),
            x,
            y,
        }
    }

    pub fn lambda(&self) -> Result<&AxisDescriptor, DimensionError> {
        self.lambda.as_ref().ok_or(DimensionError::MissingAxis("lambda"))
    }

    pub fn z(&self) -> Result<&AxisDescriptor, DimensionError> {
        self.z.as_ref().ok_or(DimensionError::MissingAxis("z"))
    }

    /// Verify this set describes a `[lambda, x, y]` array of the given shape.
    pub fn check_spectral(&self, shape: (usize, usize, usize)) -> Result<(), DimensionError> {
        let lambda = self.lambda()?;
        if lambda.unit() != AxisUnit::Nanometers {
            return Err(DimensionError::UnitMismatch {
                axis: "lambda",
                expected: AxisUnit::Nanometers,
                found: lambda.unit(),
            });
        }
        lambda.check_len("lambda", shape.0)?;
        self.check_lateral(shape.1, shape.2)
    }

    /// Verify this set describes a `[z, x, y]` array of the given shape.
    pub fn check_depth(&self, shape: (usize, usize, usize)) -> Result<(), DimensionError> {
        self.z()?.check_len("z", shape.0)?;
        self.check_lateral(shape.1, shape.2)
    }

    fn check_lateral(&self, nx: usize, ny: usize) -> Result<(), DimensionError> {
        self.x.check_len("x", nx)?;
        self.y.check_len("y", ny)
    }
}
