use ndarray::{Array2, ArrayView2};

/// Linearly interpolate a real field sampled on a rectilinear mesh onto
/// arbitrary target axes.
///
/// `field` is indexed `[y][x]` against the sorted node vectors `x_nodes` and
/// `y_nodes`. Targets that land exactly on the mesh boundary are interpolated,
/// not extrapolated. Targets outside the mesh coverage are marked NaN and
/// counted; the caller decides how to surface them.
pub fn interp_rectilinear(
    x_nodes: &[f64],
    y_nodes: &[f64],
    field: ArrayView2<'_, f64>,
    x_out: &[f64],
    y_out: &[f64],
) -> (Array2<f64>, usize) {
    debug_assert_eq!(field.dim(), (y_nodes.len(), x_nodes.len()));

    let mut out = Array2::from_elem((y_out.len(), x_out.len()), f64::NAN);
    let mut gaps = 0usize;

    for (row, &yt) in y_out.iter().enumerate() {
        let Some((cy, ty)) = locate(y_nodes, yt) else {
            gaps += x_out.len();
            continue;
        };
        for (col, &xt) in x_out.iter().enumerate() {
            let Some((cx, tx)) = locate(x_nodes, xt) else {
                gaps += 1;
                continue;
            };
            let v00 = field[[cy, cx]];
            let v01 = field[[cy, cx + 1]];
            let v10 = field[[cy + 1, cx]];
            let v11 = field[[cy + 1, cx + 1]];
            out[[row, col]] =
                (1.0 - ty) * ((1.0 - tx) * v00 + tx * v01) + ty * ((1.0 - tx) * v10 + tx * v11);
        }
    }

    (out, gaps)
}

/// Find the mesh cell containing `t` and the fractional position inside it.
///
/// Returns `None` when `t` lies outside the node range. The final node maps
/// to the last cell with fraction 1.0 so boundary hits stay interpolation.
fn locate(nodes: &[f64], t: f64) -> Option<(usize, f64)> {
    let n = nodes.len();
    if n < 2 || t < nodes[0] || t > nodes[n - 1] {
        return None;
    }
    let cell = nodes.partition_point(|v| *v <= t).clamp(1, n - 1) - 1;
    let frac = (t - nodes[cell]) / (nodes[cell + 1] - nodes[cell]);
    Some((cell, frac))
}
