//! Surface height maps and lateral regions of interest.
//!
//! Heights are in millimeters relative to the tissue-interface reference,
//! positive meaning deeper. Points where no surface was detected hold NaN.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shared::algo::nan_mean;
use shared::{Length, LengthExt};

use crate::AutofocusError;

/// Lateral rectangle restricting which map entries are averaged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Roi {
    pub fn new(x_mm: f64, y_mm: f64, width_mm: f64, height_mm: f64) -> Result<Self, AutofocusError> {
        let roi = Self {
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        };
        roi.validate()?;
        Ok(roi)
    }

    pub fn validate(&self) -> Result<(), AutofocusError> {
        if !(self.x_mm.is_finite() && self.y_mm.is_finite()) {
            return Err(AutofocusError::InvalidConfig(
                "ROI origin must be finite".to_string(),
            ));
        }
        if !(self.width_mm > 0.0 && self.height_mm > 0.0)
            || !(self.width_mm.is_finite() && self.height_mm.is_finite())
        {
            return Err(AutofocusError::InvalidConfig(format!(
                "ROI size must be positive, got {} x {} mm",
                self.width_mm, self.height_mm
            )));
        }
        Ok(())
    }

    /// Whether `(x, y)` lies inside the rectangle, edges included.
    pub fn contains(&self, x_mm: f64, y_mm: f64) -> bool {
        x_mm >= self.x_mm
            && x_mm <= self.x_mm + self.width_mm
            && y_mm >= self.y_mm
            && y_mm <= self.y_mm + self.height_mm
    }
}

/// `ceil(span / pitch)`, with ratios within rounding noise of an integer
/// taken as that integer. Unit conversions leave exact multiples a few ulps
/// above the whole number.
fn sample_count(span_um: f64, pixel_um: f64) -> usize {
    let ratio = span_um / pixel_um;
    let nearest = ratio.round();
    let count = if (ratio - nearest).abs() <= 1e-9 * ratio.abs().max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    count.max(0.0) as usize
}

/// Surface height per lateral position, row = y, column = x.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMap {
    heights_mm: Array2<f64>,
    x_mm: Vec<f64>,
    y_mm: Vec<f64>,
}

impl SurfaceMap {
    pub fn new(heights_mm: Array2<f64>, x_mm: Vec<f64>, y_mm: Vec<f64>) -> Result<Self, AutofocusError> {
        let (rows, cols) = heights_mm.dim();
        if rows != y_mm.len() || cols != x_mm.len() {
            return Err(AutofocusError::InvalidSurface(format!(
                "heights are {rows}x{cols} but coordinates are {}x{}",
                y_mm.len(),
                x_mm.len()
            )));
        }
        Ok(Self {
            heights_mm,
            x_mm,
            y_mm,
        })
    }

    /// All-NaN map covering `x_range` × `y_range` at `pixel_size` pitch.
    ///
    /// The map is `ceil(span / pixel_size)` samples along each axis with
    /// coordinates `start + i * pixel_size`.
    pub fn nan_filled(x_range: (Length, Length), y_range: (Length, Length), pixel_size: Length) -> Self {
        let pixel_mm = pixel_size.as_millimeters();
        let axis = |(start, end): (Length, Length)| -> Vec<f64> {
            let (start, end) = (start.as_millimeters(), end.as_millimeters());
            let count = sample_count((end - start) * 1000.0, pixel_size.as_micrometers());
            (0..count).map(|i| start + i as f64 * pixel_mm).collect()
        };
        let x_mm = axis(x_range);
        let y_mm = axis(y_range);
        Self {
            heights_mm: Array2::from_elem((y_mm.len(), x_mm.len()), f64::NAN),
            x_mm,
            y_mm,
        }
    }

    pub fn heights_mm(&self) -> &Array2<f64> {
        &self.heights_mm
    }

    pub fn x_mm(&self) -> &[f64] {
        &self.x_mm
    }

    pub fn y_mm(&self) -> &[f64] {
        &self.y_mm
    }

    /// `(rows, cols)`, i.e. `(y, x)`.
    pub fn dim(&self) -> (usize, usize) {
        self.heights_mm.dim()
    }

    /// Fraction of entries holding a detected height.
    pub fn detected_fraction(&self) -> f64 {
        let total = self.heights_mm.len();
        if total == 0 {
            return 0.0;
        }
        self.heights_mm.iter().filter(|h| h.is_finite()).count() as f64 / total as f64
    }

    /// NaN-aware mean height over the whole map or over `roi`.
    ///
    /// NaN when no detected height falls inside the averaged area.
    pub fn mean_offset(&self, roi: Option<&Roi>) -> f64 {
        match roi {
            None => nan_mean(self.heights_mm.iter()),
            Some(roi) => nan_mean(
                self.heights_mm
                    .indexed_iter()
                    .filter(|((row, col), _)| roi.contains(self.x_mm[*col], self.y_mm[*row]))
                    .map(|(_, h)| h),
            ),
        }
    }

    /// Subtract a stage correction from every height.
    pub fn shift(&mut self, correction_mm: f64) {
        self.heights_mm.mapv_inplace(|h| h - correction_mm);
    }
}
