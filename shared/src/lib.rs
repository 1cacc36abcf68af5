//! Shared components and utilities for the OCT scanning workspace.
//!
//! This crate contains the unit types, dimension sets and numeric
//! algorithms used by the reconstruction, calibration and autofocus crates
//! so that each of them speaks the same physical units.

pub mod algo;
pub mod dimensions;
pub mod units;

pub use dimensions::{AxisDescriptor, AxisUnit, DimensionError, Dimensions};
pub use units::{Length, LengthExt};
