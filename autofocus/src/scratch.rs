use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::AutofocusError;

const SCAN_DIR_PREFIX: &str = "autofocus-scan-";

/// Temporary folder holding the tiles of one autofocus scan.
///
/// The folder and its contents are removed when this value is dropped, on
/// success and on every error path alike.
pub struct ScanScratch {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScanScratch {
    /// Create a fresh folder under `parent`, or under the system temp dir.
    pub fn create(parent: Option<&Path>) -> Result<Self, AutofocusError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCAN_DIR_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(AutofocusError::TempStorage)?;
        let path = dir.path().to_path_buf();
        debug!("Created scan folder {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScanScratch {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed scan folder {}", self.path.display()),
                Err(e) => warn!("Failed to remove scan folder {}: {e}", self.path.display()),
            }
        }
    }
}
