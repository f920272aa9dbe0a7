//! Pairwise ground-distance matrices over selected scalar axes.
//!
//! The transport solve consumes the *squared* Euclidean matrix, and the
//! stacked decomposition consumes one absolute-difference matrix per axis, so
//! both are built directly; the rooted metric is derived on request. All
//! builders accumulate whole rows per axis rather than running a scalar
//! triple loop: same result, one pass over each N×N matrix per axis.

use crate::{Error, Result};
use ndarray::Array2;

/// Check a dimension selector against a column count: non-empty, distinct,
/// all indices in range.
pub fn validate_selector(selector: &[usize], ncols: usize) -> Result<()> {
    if selector.is_empty() {
        return Err(Error::InvalidSelector("selector must be non-empty"));
    }
    for (k, &d) in selector.iter().enumerate() {
        if d >= ncols {
            return Err(Error::InvalidSelector("selector index out of column range"));
        }
        if selector[..k].contains(&d) {
            return Err(Error::InvalidSelector("selector indices must be distinct"));
        }
    }
    Ok(())
}

fn check_clouds(x: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
    if x.nrows() != y.nrows() {
        return Err(Error::ShapeMismatch("point clouds must have equal length"));
    }
    if x.ncols() != y.ncols() {
        return Err(Error::ShapeMismatch(
            "point clouds must have equal dimensionality",
        ));
    }
    Ok(())
}

/// Squared Euclidean distances restricted to the selected axes:
/// `out[i][j] = Σ_{d ∈ selector} (x[i][d] − y[j][d])²`.
pub fn squared_cost_matrix(
    x: &Array2<f64>,
    y: &Array2<f64>,
    selector: &[usize],
) -> Result<Array2<f64>> {
    check_clouds(x, y)?;
    validate_selector(selector, x.ncols())?;

    let n = x.nrows();
    let mut sq = Array2::zeros((n, n));
    for &d in selector {
        let xc = x.column(d);
        let yc = y.column(d);
        for (i, mut row) in sq.rows_mut().into_iter().enumerate() {
            let xi = xc[i];
            for (j, cell) in row.iter_mut().enumerate() {
                let diff = xi - yc[j];
                *cell += diff * diff;
            }
        }
    }
    Ok(sq)
}

/// Euclidean distances restricted to the selected axes:
/// `out[i][j] = sqrt(Σ_{d ∈ selector} (x[i][d] − y[j][d])²)`.
pub fn euclidean_cost_matrix(
    x: &Array2<f64>,
    y: &Array2<f64>,
    selector: &[usize],
) -> Result<Array2<f64>> {
    let mut cost = squared_cost_matrix(x, y, selector)?;
    cost.mapv_inplace(f64::sqrt);
    Ok(cost)
}

/// Single-axis absolute differences: `out[i][j] = |x[i][axis] − y[j][axis]|`.
pub fn axis_abs_diff(x: &Array2<f64>, y: &Array2<f64>, axis: usize) -> Result<Array2<f64>> {
    check_clouds(x, y)?;
    if axis >= x.ncols() {
        return Err(Error::InvalidSelector("selector index out of column range"));
    }

    let n = x.nrows();
    let xc = x.column(axis);
    let yc = y.column(axis);
    let mut out = Array2::zeros((n, n));
    for (i, mut row) in out.rows_mut().into_iter().enumerate() {
        let xi = xc[i];
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (xi - yc[j]).abs();
        }
    }
    Ok(out)
}
