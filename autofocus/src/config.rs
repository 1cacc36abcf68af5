//! Configuration for the surface autofocus controller.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shared::{Length, LengthExt};

use crate::surface::Roi;
use crate::AutofocusError;

/// Default tolerance on the mean surface offset, in millimeters.
pub const DEFAULT_ACCEPTABLE_RANGE_MM: f64 = 0.010;

/// How much of the reconstructed depth range is kept around the focus pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropPolicy {
    /// Keep the whole depth axis
    Full,
    /// Keep `focus ± half_height_pix` depth pixels
    AroundFocus { half_height_pix: usize },
}

impl Default for CropPolicy {
    fn default() -> Self {
        CropPolicy::AroundFocus {
            half_height_pix: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutofocusConfig {
    /// When false, skip every hardware and processing step and return an
    /// all-NaN surface map of the requested geometry
    pub hardware_enabled: bool,
    /// Move the stage when out of focus; otherwise only report the offset
    pub auto_correct: bool,

    /// Lateral scan extent along x (start, end)
    pub x_range: (Length, Length),
    /// Lateral scan extent along y (start, end)
    pub y_range: (Length, Length),
    /// Lateral pixel pitch
    pub pixel_size: Length,

    /// Depth pixel the objective focuses at, from calibration
    pub focus_position_in_image_zpix: Option<usize>,
    /// Quadratic dispersion term from calibration (rad·nm²)
    pub dispersion_quadratic_term: f64,
    pub crop: CropPolicy,

    /// Restrict the mean offset to this lateral rectangle
    pub roi: Option<Roi>,
    /// Offsets within ± this many millimeters count as in focus (boundary
    /// inclusive). Kept as a plain number so the comparison sees exactly the
    /// configured value.
    pub acceptable_range_mm: f64,

    /// Parent directory for the temporary scan folder; system temp if unset
    pub temp_dir_parent: Option<PathBuf>,
}

impl Default for AutofocusConfig {
    fn default() -> Self {
        Self {
            hardware_enabled: true,
            auto_correct: true,
            x_range: (Length::from_millimeters(0.0), Length::from_millimeters(1.0)),
            y_range: (Length::from_millimeters(0.0), Length::from_millimeters(1.0)),
            pixel_size: Length::from_micrometers(1.0),
            focus_position_in_image_zpix: None,
            dispersion_quadratic_term: 0.0,
            crop: CropPolicy::default(),
            roi: None,
            acceptable_range_mm: DEFAULT_ACCEPTABLE_RANGE_MM,
            temp_dir_parent: None,
        }
    }
}

impl AutofocusConfig {
    /// Check scan geometry, tolerance and ROI.
    ///
    /// The focus pixel is checked when a run starts.
    pub fn validate(&self) -> Result<(), AutofocusError> {
        let pixel_um = self.pixel_size.as_micrometers();
        if !(pixel_um > 0.0) || !pixel_um.is_finite() {
            return Err(AutofocusError::InvalidConfig(format!(
                "pixel_size must be positive, got {pixel_um} um"
            )));
        }
        for (name, (start, end)) in [("x_range", self.x_range), ("y_range", self.y_range)] {
            let (start, end) = (start.as_millimeters(), end.as_millimeters());
            if !(start.is_finite() && end.is_finite()) || end <= start {
                return Err(AutofocusError::InvalidConfig(format!(
                    "{name} must satisfy start < end, got ({start}, {end}) mm"
                )));
            }
        }
        let tolerance = self.acceptable_range_mm;
        if !(tolerance >= 0.0) || !tolerance.is_finite() {
            return Err(AutofocusError::InvalidConfig(format!(
                "acceptable_range_mm must be non-negative, got {tolerance} mm"
            )));
        }
        if !self.dispersion_quadratic_term.is_finite() {
            return Err(AutofocusError::InvalidConfig(
                "dispersion_quadratic_term must be finite".to_string(),
            ));
        }
        if let CropPolicy::AroundFocus { half_height_pix: 0 } = self.crop {
            return Err(AutofocusError::InvalidConfig(
                "crop half height must be at least one pixel".to_string(),
            ));
        }
        if let Some(roi) = &self.roi {
            roi.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutofocusConfig::default();
        assert!(config.hardware_enabled);
        assert!(config.auto_correct);
        assert!(config.focus_position_in_image_zpix.is_none());
        assert_eq!(config.acceptable_range_mm, 0.010);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let reversed = AutofocusConfig {
            x_range: (Length::from_millimeters(1.0), Length::from_millimeters(0.0)),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());

        let zero_pixel = AutofocusConfig {
            pixel_size: Length::from_micrometers(0.0),
            ..Default::default()
        };
        assert!(zero_pixel.validate().is_err());

        let negative_tolerance = AutofocusConfig {
            acceptable_range_mm: -0.01,
            ..Default::default()
        };
        assert!(negative_tolerance.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_roi() {
        let config = AutofocusConfig {
            roi: Some(Roi {
                x_mm: 0.0,
                y_mm: 0.0,
                width_mm: -1.0,
                height_mm: 1.0,
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AutofocusError::InvalidConfig(_))));
    }
}
