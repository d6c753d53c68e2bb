use serde::{Deserialize, Serialize};

/// Options governing a single scan load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Read the reference columns and produce a calibration field.
    pub apply_calibration: bool,
    /// Window length for smoothing the reference channels before
    /// interpolation. `None` (or a window of 1) uses the raw reference.
    pub smoothing_window: Option<usize>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            apply_calibration: true,
            smoothing_window: None,
        }
    }
}

/// Summary returned by a successful load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    /// Number of raster rows consumed.
    pub rows: usize,
    /// Regularized grid nodes that fell outside the raw sample coverage and
    /// were marked as missing (NaN) instead of interpolated.
    pub coverage_gaps: usize,
}

/// Common error type for scan ingestion.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("insufficient grid: {0}")]
    InsufficientGrid(String),
    #[error("grid mismatch: {0}")]
    GridMismatch(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;
