//! Calibration session record.
//!
//! Every acquisition made during a calibration is stored here in acquisition
//! order, together with its stage depth and score. The arena is sized from
//! the search schedule before the first acquisition and is then handed by
//! reference to each calibration stage.

use ndarray::Array3;
use shared::algo::mean_abs;
use shared::{Dimensions, Length, LengthExt};

/// Depth offsets closer than this are treated as the same acquisition.
const SAME_DEPTH_TOLERANCE_UM: f64 = 1e-3;

/// One acquisition of the reference target.
#[derive(Debug, Clone)]
pub struct SessionSample {
    /// Stage depth offset the acquisition was taken at
    pub depth: Length,
    pub interferogram: Array3<f64>,
    pub dims: Dimensions,
    /// Mean absolute raw signal
    pub score: f64,
}

impl SessionSample {
    pub fn new(depth: Length, interferogram: Array3<f64>, dims: Dimensions) -> Self {
        let score = mean_abs(interferogram.iter());
        Self {
            depth,
            interferogram,
            dims,
            score,
        }
    }
}

/// Arena of all samples acquired during one calibration.
#[derive(Debug, Clone, Default)]
pub struct CalibrationSession {
    samples: Vec<SessionSample>,
    at_focus: Option<usize>,
}

impl CalibrationSession {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            at_focus: None,
        }
    }

    /// Store a sample and return its index.
    ///
    /// The highest-scoring sample so far becomes the at-focus sample.
    pub fn push(&mut self, sample: SessionSample) -> usize {
        let index = self.samples.len();
        let is_best = match self.at_focus() {
            Some(best) => sample.score > best.score,
            None => sample.score.is_finite(),
        };
        self.samples.push(sample);
        if is_best {
            self.at_focus = Some(index);
        }
        index
    }

    /// Index of a sample already acquired at `depth`.
    pub fn find(&self, depth: Length) -> Option<usize> {
        let target = depth.as_micrometers();
        self.samples
            .iter()
            .position(|s| (s.depth.as_micrometers() - target).abs() < SAME_DEPTH_TOLERANCE_UM)
    }

    pub fn get(&self, index: usize) -> Option<&SessionSample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[SessionSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    pub fn at_focus_index(&self) -> Option<usize> {
        self.at_focus
    }

    pub fn at_focus(&self) -> Option<&SessionSample> {
        self.at_focus.and_then(|i| self.samples.get(i))
    }
}
