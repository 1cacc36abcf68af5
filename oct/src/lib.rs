//! Spectral-domain OCT signal processing.
//!
//! [`reconstruct`] turns a raw spectral interferogram into a complex depth
//! scan and [`simulate`] produces the interferogram a scanner would record
//! from a known reflectivity volume. The two are exact inverses of each
//! other for zero dispersion, which is how the reconstruction is tested.

pub mod depth_axis;
pub mod error;
pub mod reconstruct;
pub mod scan;
pub mod simulate;

pub use depth_axis::{depth_axis, depth_pixel_size, WavenumberBand};
pub use error::OctError;
pub use reconstruct::reconstruct;
pub use scan::{ComplexDepthScan, Interferogram};
pub use simulate::{simulate, SimulationParams};
