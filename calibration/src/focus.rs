//! Focus pixel localization.

use std::ops::Range;

use oct::{reconstruct, ComplexDepthScan, OctError};
use shared::algo::argmax_in;
use shared::{AxisDescriptor, Length};
use tracing::{debug, info};

use crate::session::CalibrationSession;
use crate::{CalibrationConfig, CalibrationError, LOG_INTENSITY_FLOOR};

/// Depth profile of one session sample after dispersion compensation.
#[derive(Debug, Clone)]
pub struct ReconstructedSample {
    /// Index into the session arena
    pub index: usize,
    pub depth: Length,
    pub score: f64,
    pub mean_log_intensity: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FocusLocalization {
    pub focus_pixel: usize,
    /// Depth bins the focus pixel was searched in
    pub search_range: Range<usize>,
    pub depth_axis: AxisDescriptor,
    /// Full reconstruction of the at-focus sample
    pub at_focus_scan: ComplexDepthScan,
    /// One profile per session sample, in acquisition order
    pub profiles: Vec<ReconstructedSample>,
}

/// Depth bins within `half_window` of `guess`, clipped to the axis.
pub fn search_range(guess: usize, half_window: usize, depth_len: usize) -> Range<usize> {
    let guess = guess.min(depth_len.saturating_sub(1));
    guess.saturating_sub(half_window)..(guess + half_window + 1).min(depth_len)
}

/// Reconstruct every session sample with `dispersion` and locate the focus
/// pixel as the brightest bin of the at-focus sample near the initial guess.
pub fn localize_focus(
    session: &CalibrationSession,
    dispersion: f64,
    config: &CalibrationConfig,
) -> Result<FocusLocalization, CalibrationError> {
    let at_focus_index = session.at_focus_index().ok_or(CalibrationError::NoSamples)?;

    let mut profiles = Vec::with_capacity(session.len());
    let mut at_focus: Option<(ComplexDepthScan, AxisDescriptor)> = None;
    for (index, sample) in session.samples().iter().enumerate() {
        let (scan, dims) = reconstruct(
            &sample.interferogram,
            &sample.dims,
            dispersion,
            config.refractive_index,
        )?;
        profiles.push(ReconstructedSample {
            index,
            depth: sample.depth,
            score: sample.score,
            mean_log_intensity: scan.mean_log_intensity(LOG_INTENSITY_FLOOR),
        });
        if index == at_focus_index {
            at_focus = Some((scan, dims.z().map_err(OctError::from)?.clone()));
        }
    }
    let (at_focus_scan, depth_axis) = at_focus.ok_or(CalibrationError::NoSamples)?;

    let depth_len = depth_axis.len();
    let guess = config.initial_focus_guess_pix.unwrap_or(depth_len / 2);
    let range = search_range(guess, config.focus_search_half_window, depth_len);
    debug!(
        "Searching focus pixel in [{}, {}) around guess {}",
        range.start, range.end, guess
    );

    let profile = &profiles[at_focus_index].mean_log_intensity;
    let pixel = argmax_in(profile, range.clone());
    match pixel {
        Some(p) if p > 0 && p + 1 < depth_len => {
            info!(
                "Focus pixel {} ({:.2} um at the assumed refractive index)",
                p,
                depth_axis.values()[p]
            );
            Ok(FocusLocalization {
                focus_pixel: p,
                search_range: range,
                depth_axis,
                at_focus_scan,
                profiles,
            })
        }
        _ => Err(CalibrationError::FocusOutOfRange { pixel, depth_len }),
    }
}
