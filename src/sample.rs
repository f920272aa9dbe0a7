//! Subsampling and normalization of scalar point clouds.
//!
//! Both input clouds are reduced to a fixed-size random subsample (without
//! replacement) and every column is rescaled by the standard deviation of the
//! *reference* subsample's corresponding column, so that axes with very
//! different natural units (mixture fraction vs. temperature in Kelvin)
//! contribute comparably to the ground distance.

use crate::{ground, Error, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build the subsampling RNG: deterministic ChaCha8 for `Some(seed)`,
/// entropy-seeded otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Draw `n` rows uniformly at random without replacement.
pub fn subsample(cloud: &Array2<f64>, n: usize, rng: &mut impl Rng) -> Result<Array2<f64>> {
    let rows = cloud.nrows();
    if rows < n {
        return Err(Error::InsufficientSamples {
            requested: n,
            available: rows,
        });
    }
    let picked = rand::seq::index::sample(rng, rows, n);
    let mut out = Array2::zeros((n, cloud.ncols()));
    for (k, i) in picked.into_iter().enumerate() {
        out.row_mut(k).assign(&cloud.row(i));
    }
    Ok(out)
}

/// Population standard deviation (ddof = 0) of each column.
pub fn column_std(cloud: &Array2<f64>) -> Array1<f64> {
    let rows = cloud.nrows();
    let mut out = Array1::zeros(cloud.ncols());
    if rows == 0 {
        return out;
    }
    for (k, col) in cloud.columns().into_iter().enumerate() {
        let mean = col.sum() / rows as f64;
        let mse = col
            .iter()
            .map(|&v| {
                let e = v - mean;
                e * e
            })
            .sum::<f64>()
            / rows as f64;
        out[k] = mse.sqrt();
    }
    out
}

/// Divide each column by its scale entry.
///
/// A selected axis with a nonpositive or non-finite scale is
/// [`Error::DegenerateScale`]. An *unselected* degenerate axis passes through
/// unscaled: it is never consumed downstream, and dividing by zero would leak
/// NaN into the output.
pub fn normalize(
    cloud: &Array2<f64>,
    scale: &Array1<f64>,
    selector: &[usize],
) -> Result<Array2<f64>> {
    if scale.len() != cloud.ncols() {
        return Err(Error::ShapeMismatch("scale length must match column count"));
    }
    ground::validate_selector(selector, cloud.ncols())?;
    for &d in selector {
        let s = scale[d];
        if !s.is_finite() || s <= 0.0 {
            return Err(Error::DegenerateScale(d));
        }
    }
    let mut out = cloud.clone();
    for (k, mut col) in out.columns_mut().into_iter().enumerate() {
        let s = scale[k];
        if s.is_finite() && s > 0.0 {
            col.mapv_inplace(|v| v / s);
        }
    }
    Ok(out)
}

/// A matched pair of fixed-size subsamples, raw and normalized.
///
/// `scale` is computed from the reference subsample only and applied to both
/// clouds; the raw subsamples are kept for unnormalized reporting and
/// histogram plots.
#[derive(Debug, Clone)]
pub struct SampledPair {
    pub reference: Array2<f64>,
    pub candidate: Array2<f64>,
    pub reference_norm: Array2<f64>,
    pub candidate_norm: Array2<f64>,
    pub scale: Array1<f64>,
}

/// Subsample both clouds to `sample_size` rows and normalize them by the
/// reference subsample's per-column standard deviation.
///
/// The standard deviation is taken over *all* columns of the reference
/// subsample, not just the selected ones, matching the reference-data
/// convention this pipeline reproduces.
pub fn draw_pair(
    reference: &Array2<f64>,
    candidate: &Array2<f64>,
    selector: &[usize],
    sample_size: usize,
    rng: &mut impl Rng,
) -> Result<SampledPair> {
    if reference.ncols() != candidate.ncols() {
        return Err(Error::ShapeMismatch("tables must have the same column count"));
    }
    ground::validate_selector(selector, reference.ncols())?;

    let reference = subsample(reference, sample_size, rng)?;
    let candidate = subsample(candidate, sample_size, rng)?;
    let scale = column_std(&reference);
    let reference_norm = normalize(&reference, &scale, selector)?;
    let candidate_norm = normalize(&candidate, &scale, selector)?;

    Ok(SampledPair {
        reference,
        candidate,
        reference_norm,
        candidate_norm,
        scale,
    })
}
