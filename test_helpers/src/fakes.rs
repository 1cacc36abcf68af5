//! In-memory collaborators for the surface autofocus controller.
//!
//! Each fake records what it was asked to do and can be told to fail, so
//! tests can drive every state of a run without hardware.

use std::path::{Path, PathBuf};

use autofocus::{ReconstructionRequest, SurfaceDetector, SurfaceMap, VolumeReconstructor};
use hardware::{ScanError, ScanMetadata, TileScanRequest, TileScanner};
use ndarray::{Array2, Array3};
use shared::{AxisDescriptor, AxisUnit, Dimensions};
use thiserror::Error;

/// Failure injected into a fake collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct FakeFailure(pub String);

/// Tile scanner that writes placeholder tiles into the output folder.
#[derive(Debug, Default)]
pub struct FakeTileScanner {
    tiles: usize,
    failure: Option<String>,
    output_dirs: Vec<PathBuf>,
    requests: Vec<TileScanRequest>,
}

impl FakeTileScanner {
    pub fn new(tiles: usize) -> Self {
        Self {
            tiles,
            ..Default::default()
        }
    }

    /// Fail every scan, after writing the tiles.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Folders scanned into, in call order.
    pub fn output_dirs(&self) -> &[PathBuf] {
        &self.output_dirs
    }

    pub fn requests(&self) -> &[TileScanRequest] {
        &self.requests
    }
}

impl TileScanner for FakeTileScanner {
    fn scan(&mut self, request: &TileScanRequest, output_dir: &Path) -> Result<ScanMetadata, ScanError> {
        self.output_dirs.push(output_dir.to_path_buf());
        self.requests.push(*request);
        for tile in 0..self.tiles {
            std::fs::write(output_dir.join(format!("tile_{tile:03}.raw")), [0u8; 16])?;
        }
        if let Some(message) = &self.failure {
            return Err(ScanError::Acquisition(message.clone()));
        }
        Ok(ScanMetadata {
            output_dir: output_dir.to_path_buf(),
            tiles: self.tiles,
        })
    }
}

/// Reconstructor returning an empty volume of fixed lateral geometry.
#[derive(Debug)]
pub struct FakeVolumeReconstructor {
    depth_len: usize,
    nx: usize,
    ny: usize,
    pitch_mm: f64,
    failure: Option<String>,
    requests: Vec<ReconstructionRequest>,
    tiles_seen: Vec<usize>,
}

impl FakeVolumeReconstructor {
    pub fn new(depth_len: usize, nx: usize, ny: usize, pitch_mm: f64) -> Self {
        Self {
            depth_len,
            nx,
            ny,
            pitch_mm,
            failure: None,
            requests: Vec::new(),
            tiles_seen: Vec::new(),
        }
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn requests(&self) -> &[ReconstructionRequest] {
        &self.requests
    }

    /// Number of files found in the scan folder on each call.
    pub fn tiles_seen(&self) -> &[usize] {
        &self.tiles_seen
    }
}

impl VolumeReconstructor for FakeVolumeReconstructor {
    type Error = FakeFailure;

    fn reconstruct(
        &mut self,
        scan_dir: &Path,
        request: &ReconstructionRequest,
    ) -> Result<(Array3<f64>, Dimensions), FakeFailure> {
        self.requests.push(*request);
        let tiles = std::fs::read_dir(scan_dir)
            .map_err(|e| FakeFailure(format!("cannot read {}: {e}", scan_dir.display())))?
            .count();
        self.tiles_seen.push(tiles);
        if let Some(message) = &self.failure {
            return Err(FakeFailure(message.clone()));
        }

        let window = request.depth_window(self.depth_len);
        let dims = Dimensions::depth(
            AxisDescriptor::new(window.map(|p| p as f64).collect(), AxisUnit::Pixels),
            AxisDescriptor::uniform(0.0, self.pitch_mm, self.nx, AxisUnit::Millimeters),
            AxisDescriptor::uniform(0.0, self.pitch_mm, self.ny, AxisUnit::Millimeters),
        );
        let volume = Array3::zeros((dims.z.as_ref().map_or(0, |z| z.len()), self.nx, self.ny));
        Ok((volume, dims))
    }
}

/// Detector reporting either a fixed map or a flat surface at a set offset.
#[derive(Debug, Default)]
pub struct FakeSurfaceDetector {
    offset_mm: f64,
    preset: Option<Array2<f64>>,
    failure: Option<String>,
    calls: usize,
}

impl FakeSurfaceDetector {
    /// Flat surface at `offset_mm` everywhere.
    pub fn flat(offset_mm: f64) -> Self {
        Self {
            offset_mm,
            ..Default::default()
        }
    }

    /// Fixed heights `[y, x]`; must match the reconstructor's lateral shape.
    pub fn with_heights(heights_mm: Array2<f64>) -> Self {
        Self {
            preset: Some(heights_mm),
            ..Default::default()
        }
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Move the flat surface, e.g. to follow a stage correction.
    pub fn set_offset(&mut self, offset_mm: f64) {
        self.offset_mm = offset_mm;
    }

    pub fn offset_mm(&self) -> f64 {
        self.offset_mm
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SurfaceDetector for FakeSurfaceDetector {
    type Error = FakeFailure;

    fn detect(&mut self, _volume: &Array3<f64>, dims: &Dimensions) -> Result<SurfaceMap, FakeFailure> {
        self.calls += 1;
        if let Some(message) = &self.failure {
            return Err(FakeFailure(message.clone()));
        }
        let x_mm = dims.x.values().to_vec();
        let y_mm = dims.y.values().to_vec();
        let heights = match &self.preset {
            Some(heights) => heights.clone(),
            None => Array2::from_elem((y_mm.len(), x_mm.len()), self.offset_mm),
        };
        SurfaceMap::new(heights, x_mm, y_mm).map_err(|e| FakeFailure(e.to_string()))
    }
}
