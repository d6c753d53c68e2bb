use crate::math::interp::interp_rectilinear;
use crate::math::smoothing::kaiser_smooth;
use crate::prelude::{LoadConfig, LoadReport, ScanError, ScanResult};
use crate::processing::grid::{unique_sorted, GridGeometry};
use crate::processing::parser::{parse_table, ScanSample};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::io::BufRead;

/// Shape parameter used when smoothing the reference channels.
const CAL_SMOOTH_BETA: f64 = 1.0;

/// Regularized data of a single polarization scan.
///
/// A fresh instance is empty. `load` derives the grid geometry from the raw
/// raster rows, interpolates the transmission (and optionally calibration)
/// field onto the regularized grid, and populates every field at once; a
/// reload replaces them all. A failed load leaves the prior state untouched.
/// Each instance expects a single loader thread; concurrent loads on one
/// instance are a precondition violation, not a guarded case.
#[derive(Debug)]
pub struct ScanData {
    geometry: Option<GridGeometry>,
    s21: Option<Array2<Complex64>>,
    cal_data: Option<Array2<Complex64>>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl ScanData {
    pub fn new() -> Self {
        Self {
            geometry: None,
            s21: None,
            cal_data: None,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Load pre-parsed raster rows, replacing any previously loaded state.
    pub fn load(&mut self, samples: &[ScanSample], config: &LoadConfig) -> ScanResult<LoadReport> {
        match build_fields(samples, config) {
            Ok((geometry, s21, cal_data, report)) => {
                if report.coverage_gaps > 0 {
                    self.logger.warn(&format!(
                        "{} regularized node(s) outside raw sample coverage, marked NaN",
                        report.coverage_gaps
                    ));
                    self.metrics.record_coverage_gaps(report.coverage_gaps);
                }
                self.geometry = Some(geometry);
                self.s21 = Some(s21);
                self.cal_data = cal_data;
                self.metrics.record_load();
                self.logger.record(&format!(
                    "loaded {} rows onto a {}x{} grid",
                    report.rows, geometry.x_points, geometry.y_points
                ));
                Ok(report)
            }
            Err(err) => {
                self.metrics.record_error();
                Err(err)
            }
        }
    }

    /// Parse a comma-delimited table from `reader` and load it.
    pub fn load_csv<R: BufRead>(&mut self, reader: R, config: &LoadConfig) -> ScanResult<LoadReport> {
        let samples = match parse_table(reader) {
            Ok(samples) => samples,
            Err(err) => {
                self.metrics.record_error();
                return Err(err);
            }
        };
        self.load(&samples, config)
    }

    pub fn is_loaded(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.geometry.as_ref()
    }

    /// Interpolated complex transmission field, indexed `[y][x]`.
    pub fn s21(&self) -> Option<&Array2<Complex64>> {
        self.s21.as_ref()
    }

    /// Interpolated complex calibration field, same shape as `s21`.
    pub fn cal_data(&self) -> Option<&Array2<Complex64>> {
        self.cal_data.as_ref()
    }

    pub fn x_limits(&self) -> Option<(f64, f64)> {
        self.geometry.map(|g| g.x_limits)
    }

    pub fn y_limits(&self) -> Option<(f64, f64)> {
        self.geometry.map(|g| g.y_limits)
    }

    pub fn x_points(&self) -> Option<usize> {
        self.geometry.map(|g| g.x_points)
    }

    pub fn y_points(&self) -> Option<usize> {
        self.geometry.map(|g| g.y_points)
    }

    pub fn x_step(&self) -> Option<f64> {
        self.geometry.map(|g| g.x_step)
    }

    pub fn y_step(&self) -> Option<f64> {
        self.geometry.map(|g| g.y_step)
    }

    pub fn x_values(&self) -> Option<Array1<f64>> {
        self.geometry.map(|g| g.x_values())
    }

    pub fn y_values(&self) -> Option<Array1<f64>> {
        self.geometry.map(|g| g.y_values())
    }

    pub fn xy_grids(&self) -> Option<(Array2<f64>, Array2<f64>)> {
        self.geometry.map(|g| g.xy_grids())
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}

impl Default for ScanData {
    fn default() -> Self {
        Self::new()
    }
}

type BuiltFields = (
    GridGeometry,
    Array2<Complex64>,
    Option<Array2<Complex64>>,
    LoadReport,
);

/// Derive geometry and interpolate all requested channels.
///
/// Pure with respect to the `ScanData` instance, so a failure cannot leave
/// partially replaced state behind.
fn build_fields(samples: &[ScanSample], config: &LoadConfig) -> ScanResult<BuiltFields> {
    if samples.is_empty() {
        return Err(ScanError::MalformedInput("empty scan table".into()));
    }

    let x_axis = unique_sorted(samples.iter().map(|s| s.x));
    let y_axis = unique_sorted(samples.iter().map(|s| s.y));
    let geometry = GridGeometry::from_axes(&x_axis, &y_axis)?;

    // Rows must form a complete rectangular raster, ordered row-major
    // against the unique-value mesh (y outer, x inner).
    let expected = geometry.x_points * geometry.y_points;
    if samples.len() != expected {
        return Err(ScanError::GridMismatch(format!(
            "{} row(s) for a {}x{} raster, expected {}",
            samples.len(),
            geometry.x_points,
            geometry.y_points,
            expected
        )));
    }

    let x_out = geometry.x_values().to_vec();
    let y_out = geometry.y_values().to_vec();

    let (s21, s21_gaps) = interp_complex(
        &x_axis,
        &y_axis,
        samples.iter().map(|s| s.transmission.re).collect(),
        samples.iter().map(|s| s.transmission.im).collect(),
        &x_out,
        &y_out,
    )?;

    let mut coverage_gaps = s21_gaps;
    let cal_data = if config.apply_calibration {
        let references: Option<Vec<Complex64>> = samples.iter().map(|s| s.reference).collect();
        let references = references.ok_or_else(|| {
            ScanError::MalformedInput(
                "calibration requested but reference columns are missing".into(),
            )
        })?;

        let mut cal_re: Vec<f64> = references.iter().map(|c| c.re).collect();
        let mut cal_im: Vec<f64> = references.iter().map(|c| c.im).collect();
        if let Some(window) = config.smoothing_window {
            cal_re = kaiser_smooth(&cal_re, CAL_SMOOTH_BETA, window);
            cal_im = kaiser_smooth(&cal_im, CAL_SMOOTH_BETA, window);
        }

        let (cal, cal_gaps) = interp_complex(&x_axis, &y_axis, cal_re, cal_im, &x_out, &y_out)?;
        coverage_gaps += cal_gaps;
        Some(cal)
    } else {
        None
    };

    let report = LoadReport {
        rows: samples.len(),
        coverage_gaps,
    };
    Ok((geometry, s21, cal_data, report))
}

/// Interpolate the real and imaginary channels independently and recombine.
///
/// Complex values are not interpolated natively; each channel is treated as a
/// real-valued field on the raw mesh.
fn interp_complex(
    x_axis: &[f64],
    y_axis: &[f64],
    re: Vec<f64>,
    im: Vec<f64>,
    x_out: &[f64],
    y_out: &[f64],
) -> ScanResult<(Array2<Complex64>, usize)> {
    let shape = (y_axis.len(), x_axis.len());
    let re_mesh = Array2::from_shape_vec(shape, re)
        .map_err(|e| ScanError::GridMismatch(e.to_string()))?;
    let im_mesh = Array2::from_shape_vec(shape, im)
        .map_err(|e| ScanError::GridMismatch(e.to_string()))?;

    let (re_out, re_gaps) = interp_rectilinear(x_axis, y_axis, re_mesh.view(), x_out, y_out);
    let (im_out, im_gaps) = interp_rectilinear(x_axis, y_axis, im_mesh.view(), x_out, y_out);

    let field = Array2::from_shape_fn((y_out.len(), x_out.len()), |(row, col)| {
        Complex64::new(re_out[[row, col]], im_out[[row, col]])
    });
    Ok((field, re_gaps.max(im_gaps)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Raster rows in scan order (y outer, x inner) with a deterministic
    /// field and a slowly drifting reference channel.
    fn raster_rows(x_axis: &[f64], y_axis: &[f64]) -> Vec<ScanSample> {
        let mut rows = Vec::new();
        for &y in y_axis {
            for &x in x_axis {
                let index = rows.len() as f64;
                rows.push(ScanSample {
                    x,
                    y,
                    transmission: Complex64::new(x + y, x - y),
                    reference: Some(Complex64::new(1.0 + 0.001 * index, -0.5)),
                });
            }
        }
        rows
    }

    fn four_by_five() -> Vec<ScanSample> {
        raster_rows(&[0.0, 1.0, 2.0, 3.0], &[0.0, 10.0, 20.0, 30.0, 40.0])
    }

    #[test]
    fn four_by_five_raster_produces_expected_geometry() {
        let mut scan = ScanData::new();
        let report = scan.load(&four_by_five(), &LoadConfig::default()).unwrap();

        assert_eq!(report.rows, 20);
        assert_eq!(report.coverage_gaps, 0);
        assert_eq!(scan.x_points(), Some(4));
        assert_eq!(scan.y_points(), Some(5));
        assert_eq!(scan.x_step(), Some(1.0));
        assert_eq!(scan.y_step(), Some(10.0));
        assert_eq!(scan.x_limits(), Some((0.0, 3.0)));
        assert_eq!(scan.y_limits(), Some((0.0, 40.0)));
    }

    #[test]
    fn derived_axis_views_satisfy_boundary_invariants() {
        let mut scan = ScanData::new();
        scan.load(&four_by_five(), &LoadConfig::default()).unwrap();

        let x_values = scan.x_values().unwrap();
        let y_values = scan.y_values().unwrap();
        assert_eq!(x_values.len(), scan.x_points().unwrap());
        assert_eq!(y_values.len(), scan.y_points().unwrap());
        assert_eq!(x_values[0], scan.x_limits().unwrap().0);
        assert_eq!(x_values[3], scan.x_limits().unwrap().1);
        assert_eq!(y_values[0], scan.y_limits().unwrap().0);
        assert_eq!(y_values[4], scan.y_limits().unwrap().1);
        assert_eq!(x_values[1] - x_values[0], scan.x_step().unwrap());
        assert_eq!(y_values[1] - y_values[0], scan.y_step().unwrap());
    }

    #[test]
    fn fields_share_the_grid_shape_and_hit_node_values() {
        let mut scan = ScanData::new();
        scan.load(&four_by_five(), &LoadConfig::default()).unwrap();

        let s21 = scan.s21().unwrap();
        let cal = scan.cal_data().unwrap();
        assert_eq!(s21.dim(), (5, 4));
        assert_eq!(cal.dim(), s21.dim());

        // Uniform raw spacing means the regularized nodes coincide with the
        // raw mesh, so interpolation reproduces the raw samples.
        let rows = four_by_five();
        for (index, sample) in rows.iter().enumerate() {
            let value = s21[[index / 4, index % 4]];
            assert!((value - sample.transmission).norm() < 1e-9);
        }
    }

    #[test]
    fn nonuniform_spacing_interpolates_onto_the_uniform_grid() {
        // f(x, y) = x + 0i on x nodes {0, 1, 4}; the regularized x axis is
        // {0, 2, 4}, so the middle column must interpolate to 2.
        let rows: Vec<ScanSample> = [0.0, 1.0]
            .iter()
            .flat_map(|&y| {
                [0.0, 1.0, 4.0].map(|x| ScanSample {
                    x,
                    y,
                    transmission: Complex64::new(x, 0.0),
                    reference: None,
                })
            })
            .collect();

        let mut scan = ScanData::new();
        let config = LoadConfig {
            apply_calibration: false,
            smoothing_window: None,
        };
        scan.load(&rows, &config).unwrap();

        assert_eq!(scan.x_step(), Some(2.0));
        let s21 = scan.s21().unwrap();
        assert!((s21[[0, 1]].re - 2.0).abs() < 1e-12);
        assert!((s21[[1, 1]].re - 2.0).abs() < 1e-12);
    }

    #[test]
    fn non_dyadic_raster_interpolates_without_coverage_gaps() {
        // A complete uniform raster whose stage coordinates have no exact
        // binary representation must still map onto the regularized grid
        // with every boundary node treated as interpolation, not a gap.
        let start = 11.186723898020901;
        let step = 4.991065642151254;
        let x_axis: Vec<f64> = (0..47).map(|i| start + i as f64 * step).collect();
        let y_axis = [0.0, 1.0, 2.0];
        let rows = raster_rows(&x_axis, &y_axis);

        let mut scan = ScanData::new();
        let report = scan.load(&rows, &LoadConfig::default()).unwrap();

        assert_eq!(report.coverage_gaps, 0);
        let x_values = scan.x_values().unwrap();
        assert_eq!(x_values[0], scan.x_limits().unwrap().0);
        assert_eq!(x_values[46], scan.x_limits().unwrap().1);
        let s21 = scan.s21().unwrap();
        assert_eq!(s21.dim(), (3, 47));
        assert!(s21.iter().all(|c| c.re.is_finite() && c.im.is_finite()));
        assert!(scan
            .cal_data()
            .unwrap()
            .iter()
            .all(|c| c.re.is_finite() && c.im.is_finite()));
    }

    #[test]
    fn smoothed_calibration_keeps_the_field_shape() {
        let mut scan = ScanData::new();
        let config = LoadConfig {
            apply_calibration: true,
            smoothing_window: Some(3),
        };
        scan.load(&four_by_five(), &config).unwrap();

        let cal = scan.cal_data().unwrap();
        assert_eq!(cal.dim(), scan.s21().unwrap().dim());
        assert!(cal.iter().all(|c| c.re.is_finite() && c.im.is_finite()));
    }

    #[test]
    fn calibration_can_be_skipped() {
        let mut scan = ScanData::new();
        let config = LoadConfig {
            apply_calibration: false,
            smoothing_window: None,
        };
        scan.load(&four_by_five(), &config).unwrap();
        assert!(scan.cal_data().is_none());
    }

    #[test]
    fn missing_reference_columns_fail_when_calibration_requested() {
        let mut rows = four_by_five();
        for row in &mut rows {
            row.reference = None;
        }

        let mut scan = ScanData::new();
        let err = scan.load(&rows, &LoadConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::MalformedInput(_)));
        assert!(!scan.is_loaded());
    }

    #[test]
    fn incomplete_raster_is_a_grid_mismatch() {
        let mut rows = four_by_five();
        rows.pop();

        let mut scan = ScanData::new();
        let err = scan.load(&rows, &LoadConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::GridMismatch(_)));
        assert!(!scan.is_loaded());
    }

    #[test]
    fn single_unique_x_coordinate_is_insufficient() {
        let rows: Vec<ScanSample> = (0..5)
            .map(|i| ScanSample {
                x: 0.0,
                y: i as f64,
                transmission: Complex64::new(1.0, 0.0),
                reference: Some(Complex64::new(1.0, 0.0)),
            })
            .collect();

        let mut scan = ScanData::new();
        let err = scan.load(&rows, &LoadConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::InsufficientGrid(_)));
    }

    #[test]
    fn empty_table_is_malformed() {
        let mut scan = ScanData::new();
        let err = scan.load(&[], &LoadConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::MalformedInput(_)));
    }

    #[test]
    fn reloading_the_same_table_is_idempotent() {
        let rows = four_by_five();
        let mut scan = ScanData::new();

        scan.load(&rows, &LoadConfig::default()).unwrap();
        let first_geometry = *scan.geometry().unwrap();
        let first_s21 = scan.s21().unwrap().clone();
        let first_cal = scan.cal_data().unwrap().clone();

        scan.load(&rows, &LoadConfig::default()).unwrap();
        assert_eq!(*scan.geometry().unwrap(), first_geometry);
        assert_eq!(*scan.s21().unwrap(), first_s21);
        assert_eq!(*scan.cal_data().unwrap(), first_cal);
    }

    #[test]
    fn failed_reload_preserves_previous_state() {
        let rows = four_by_five();
        let mut scan = ScanData::new();
        scan.load(&rows, &LoadConfig::default()).unwrap();
        let geometry = *scan.geometry().unwrap();

        let mut truncated = rows.clone();
        truncated.pop();
        assert!(scan.load(&truncated, &LoadConfig::default()).is_err());

        assert_eq!(*scan.geometry().unwrap(), geometry);
        assert!(scan.s21().is_some());
        let (loads, errors, _) = scan.metrics().snapshot();
        assert_eq!(loads, 1);
        assert_eq!(errors, 1);
    }

    #[test]
    fn load_csv_parses_and_loads() {
        let mut table = String::new();
        for sample in four_by_five() {
            table.push_str(&format!(
                "{},{},{},{},{},{}\n",
                sample.x,
                sample.y,
                sample.transmission.re,
                sample.transmission.im,
                sample.reference.unwrap().re,
                sample.reference.unwrap().im
            ));
        }

        let mut scan = ScanData::new();
        let report = scan
            .load_csv(table.as_bytes(), &LoadConfig::default())
            .unwrap();
        assert_eq!(report.rows, 20);
        assert_eq!(scan.x_points(), Some(4));
        assert_eq!(scan.y_points(), Some(5));
    }
}
