//! Scan ingestion and grid-regularization core for the Rust beamscanner platform.
//!
//! The modules take raw planar near-field scan tables and produce a
//! calibration-corrected complex field map on a regular grid, ready for the
//! downstream far-field transform stage.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{LoadConfig, LoadReport, ScanError, ScanResult};
pub use processing::{GridGeometry, ScanData, ScanSample};
