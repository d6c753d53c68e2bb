use crate::workflow::config::ScanJobConfig;
use anyhow::Context;
use beamcore::processing::ScanData;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Geometry and coverage summary of a completed scan load.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub rows: usize,
    pub coverage_gaps: usize,
    pub x_points: usize,
    pub y_points: usize,
    pub x_step: f64,
    pub y_step: f64,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
}

#[derive(Clone)]
pub struct Runner {
    config: ScanJobConfig,
}

impl Runner {
    pub fn new(config: ScanJobConfig) -> Self {
        Self { config }
    }

    /// Load a scan table from disk and return the populated scan with its
    /// regularized-grid summary. The file handle is released once parsing
    /// finishes.
    pub fn execute(&self, path: &Path) -> anyhow::Result<(ScanData, ScanSummary)> {
        let file = File::open(path)
            .with_context(|| format!("opening scan table {}", path.display()))?;

        let mut scan = ScanData::new();
        let report = scan
            .load_csv(BufReader::new(file), &self.config.to_load_config())
            .with_context(|| format!("loading scan table {}", path.display()))?;

        let geometry = *scan
            .geometry()
            .context("scan geometry missing after load")?;
        let summary = ScanSummary {
            rows: report.rows,
            coverage_gaps: report.coverage_gaps,
            x_points: geometry.x_points,
            y_points: geometry.y_points,
            x_step: geometry.x_step,
            y_step: geometry.y_step,
            x_limits: geometry.x_limits,
            y_limits: geometry.y_limits,
        };
        info!(
            "scan {} -> {}x{} grid, {} coverage gap(s)",
            path.display(),
            summary.x_points,
            summary.y_points,
            summary.coverage_gaps
        );
        Ok((scan, summary))
    }
}
