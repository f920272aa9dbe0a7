//! Per-axis decomposition of a multi-axis transport cost.
//!
//! The decomposition re-weights the *already optimal* coupling with each
//! axis's own squared distances instead of solving one transport problem per
//! axis. The shares therefore answer "how much of the cost this plan paid is
//! attributable to axis d", which is the quantity the stacked-bar comparison
//! reports.
//!
//! Contributions are keyed by **selector position**: `contrib[k]` belongs to
//! axis `selector[k]`, whatever its raw column index. Non-contiguous and
//! unordered selectors are therefore handled uniformly.

use crate::{ground, Error, Result};
use ndarray::{Array1, Array2};

/// Per-axis shares of the total squared transport cost under the given plan:
/// `contrib[k] = Σ_{i,j} plan[i][j] · (x[i][selector[k]] − y[j][selector[k]])²`.
pub fn axis_contributions(
    plan: &Array2<f64>,
    x: &Array2<f64>,
    y: &Array2<f64>,
    selector: &[usize],
) -> Result<Array1<f64>> {
    let n = x.nrows();
    if plan.nrows() != n || plan.ncols() != n {
        return Err(Error::ShapeMismatch(
            "transport plan shape must match the sampled clouds",
        ));
    }
    ground::validate_selector(selector, x.ncols())?;

    let mut contrib = Array1::zeros(selector.len());
    for (k, &d) in selector.iter().enumerate() {
        let abs_diff = ground::axis_abs_diff(x, y, d)?;
        contrib[k] = plan
            .iter()
            .zip(abs_diff.iter())
            .map(|(&p, &ad)| p * ad * ad)
            .sum();
    }
    Ok(contrib)
}

/// Normalize contributions to proportions summing to exactly one.
///
/// Floating-point normalization can leave `Σ proportion` a few ulps away from
/// one; the residual is added to the first entry attaining the maximum
/// proportion (ascending position order), perturbing only that entry.
pub fn proportions(contrib: &Array1<f64>) -> Result<Array1<f64>> {
    if contrib.is_empty() {
        return Err(Error::InvalidSelector("selector must be non-empty"));
    }
    if contrib.iter().any(|&c| !c.is_finite() || c < 0.0) {
        return Err(Error::Domain("contributions must be finite and nonnegative"));
    }
    let total: f64 = contrib.sum();
    if total <= 0.0 {
        return Err(Error::ZeroContribution);
    }

    let mut prop = contrib.mapv(|c| c / total);
    let drift = 1.0 - prop.sum();
    let mut largest = 0;
    for k in 1..prop.len() {
        if prop[k] > prop[largest] {
            largest = k;
        }
    }
    prop[largest] += drift;
    Ok(prop)
}
