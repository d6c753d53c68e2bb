use crate::prelude::{ScanError, ScanResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Collect the sorted set of distinct values from a coordinate column.
///
/// Equality is exact on the stored f64 representation: the motion stage is
/// assumed to report repeatable positions, so no tolerance is applied.
pub(crate) fn unique_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| *a == *b);
    out
}

/// Geometry of the regularized scan grid.
///
/// Derived once from the unique sampled coordinates along each axis and
/// immutable afterwards. The derived axis views (`x_values`, `y_values`,
/// `xy_grids`) are recomputed from the stored limits and counts on every
/// call, so they can never drift out of sync with the canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    pub x_points: usize,
    pub y_points: usize,
    pub x_step: f64,
    pub y_step: f64,
}

impl GridGeometry {
    /// Derive the grid geometry from sorted unique axis coordinates.
    ///
    /// The nominal step is `(max - min) / (points - 1)`, which is why each
    /// axis needs at least two distinct coordinates.
    pub fn from_axes(x_axis: &[f64], y_axis: &[f64]) -> ScanResult<Self> {
        if x_axis.len() < 2 {
            return Err(ScanError::InsufficientGrid(format!(
                "{} unique x coordinate(s), need at least 2",
                x_axis.len()
            )));
        }
        if y_axis.len() < 2 {
            return Err(ScanError::InsufficientGrid(format!(
                "{} unique y coordinate(s), need at least 2",
                y_axis.len()
            )));
        }

        let x_limits = (x_axis[0], x_axis[x_axis.len() - 1]);
        let y_limits = (y_axis[0], y_axis[y_axis.len() - 1]);
        Ok(Self {
            x_limits,
            y_limits,
            x_points: x_axis.len(),
            y_points: y_axis.len(),
            x_step: (x_limits.1 - x_limits.0) / (x_axis.len() - 1) as f64,
            y_step: (y_limits.1 - y_limits.0) / (y_axis.len() - 1) as f64,
        })
    }

    /// Regularized x axis: a uniform linspace over the x limits.
    pub fn x_values(&self) -> Array1<f64> {
        uniform_axis(self.x_limits.0, self.x_limits.1, self.x_points)
    }

    /// Regularized y axis: a uniform linspace over the y limits.
    pub fn y_values(&self) -> Array1<f64> {
        uniform_axis(self.y_limits.0, self.y_limits.1, self.y_points)
    }

    /// Meshgrid views of the regularized axes, indexed `[y][x]`.
    pub fn xy_grids(&self) -> (Array2<f64>, Array2<f64>) {
        let x_values = self.x_values();
        let y_values = self.y_values();
        let shape = (self.y_points, self.x_points);
        (
            Array2::from_shape_fn(shape, |(_, col)| x_values[col]),
            Array2::from_shape_fn(shape, |(row, _)| y_values[row]),
        )
    }
}

/// Uniform axis of `points` samples whose terminal nodes are exactly
/// `start` and `stop`.
///
/// `start + step * i` can land one ULP past `stop` at the final index for
/// non-dyadic coordinates, which would push the boundary column of the grid
/// outside the raw sample coverage. Pinning both ends keeps boundary nodes
/// on the mesh.
fn uniform_axis(start: f64, stop: f64, points: usize) -> Array1<f64> {
    let step = (stop - start) / (points - 1) as f64;
    Array1::from_shape_fn(points, |i| {
        if i == points - 1 {
            stop
        } else {
            start + step * i as f64
        }
    })
}
