//! Coarse-to-fine search for the stage depth that puts the reference target
//! in focus.
//!
//! Each iteration spreads `samples_per_iteration` acquisitions evenly across
//! `center ± window/2`, scores them by mean raw-signal magnitude and recenters
//! on the best one. The window shrinks geometrically; the search ends after
//! the first iteration whose sample step is finer than the pixel threshold.

use hardware::SpectralScanner;
use shared::algo::linspace;
use shared::{Length, LengthExt};
use tracing::{debug, info};

use crate::session::{CalibrationSession, SessionSample};
use crate::{CalibrationConfig, CalibrationError};

/// Windows of every coarse-to-fine iteration, fixed before acquiring.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSchedule {
    pub initial_center: Length,
    windows: Vec<Length>,
    samples_per_iteration: usize,
}

impl SearchSchedule {
    pub fn new(config: &CalibrationConfig, pixel_threshold: Length) -> Result<Self, CalibrationError> {
        config.validate()?;
        let threshold_um = pixel_threshold.as_micrometers();
        if !(threshold_um.is_finite() && threshold_um > 0.0) {
            return Err(CalibrationError::InvalidConfig(format!(
                "pixel threshold must be positive, got {threshold_um} um"
            )));
        }

        let steps = (config.samples_per_iteration - 1) as f64;
        let mut windows = Vec::new();
        let mut window_um = config.initial_window.as_micrometers();
        loop {
            windows.push(Length::from_micrometers(window_um));
            if window_um / steps < threshold_um || windows.len() >= config.max_search_iterations {
                break;
            }
            window_um *= config.window_shrink_ratio;
        }

        Ok(Self {
            initial_center: config.initial_depth,
            windows,
            samples_per_iteration: config.samples_per_iteration,
        })
    }

    pub fn windows(&self) -> &[Length] {
        &self.windows
    }

    pub fn iterations(&self) -> usize {
        self.windows.len()
    }

    /// Upper bound on acquisitions made by the search.
    pub fn total_samples(&self) -> usize {
        self.windows.len() * self.samples_per_iteration
    }

    /// Depths sampled by one iteration.
    pub fn depths(&self, center: Length, window: Length) -> Vec<Length> {
        let (c, w) = (center.as_micrometers(), window.as_micrometers());
        linspace(c - 0.5 * w, c + 0.5 * w, self.samples_per_iteration)
            .into_iter()
            .map(Length::from_micrometers)
            .collect()
    }
}

/// Acquire at `depth` unless the session already holds that depth.
pub fn acquire_sample<S: SpectralScanner>(
    scanner: &mut S,
    session: &mut CalibrationSession,
    depth: Length,
) -> Result<usize, CalibrationError> {
    if let Some(index) = session.find(depth) {
        return Ok(index);
    }
    let (interferogram, dims) = scanner.acquire(depth)?;
    let sample = SessionSample::new(depth, interferogram, dims);
    debug!(
        "Acquired depth {:.2} um, score {:.4e}",
        depth.as_micrometers(),
        sample.score
    );
    Ok(session.push(sample))
}

/// Run the schedule and return the final search center.
pub fn coarse_to_fine<S: SpectralScanner>(
    scanner: &mut S,
    schedule: &SearchSchedule,
    session: &mut CalibrationSession,
) -> Result<Length, CalibrationError> {
    let mut center = schedule.initial_center;

    for (iteration, &window) in schedule.windows().iter().enumerate() {
        let mut best: Option<(Length, f64)> = None;
        for depth in schedule.depths(center, window) {
            let index = acquire_sample(scanner, session, depth)?;
            let score = session.get(index).map_or(f64::NAN, |s| s.score);
            if best.map_or(score.is_finite(), |(_, s)| score > s) {
                best = Some((depth, score));
            }
        }

        let (depth, score) = best.ok_or(CalibrationError::NoSamples)?;
        center = depth;
        info!(
            "Search iteration {}/{}: window {:.2} um, best depth {:.2} um (score {:.4e})",
            iteration + 1,
            schedule.iterations(),
            window.as_micrometers(),
            center.as_micrometers(),
            score
        );
    }

    Ok(center)
}
