//! # flamew2
//!
//! Quantitative comparison of turbulent-flame measurements via the discrete
//! 2-Wasserstein (earth-mover) distance.
//!
//! ## The Problem
//!
//! Given two empirical scalar distributions (one sampled from experiment, one
//! from simulation), how far apart are they? Moment comparisons miss shape;
//! pointwise divergences break down on disjoint supports. Optimal transport
//! compares the full distributions: the distance is the minimum cost of moving
//! one sample cloud onto the other.
//!
//! ## Pipeline
//!
//! | Stage | Function | Notes |
//! |-------|----------|-------|
//! | Subsample + normalize | [`sample::draw_pair`] | N points each, scaled by reference std |
//! | Ground distances | [`ground::squared_cost_matrix`] | restricted to selected axes |
//! | Exact transport | [`solver::ExactSolver`] | successive shortest paths, O(N³) |
//! | Distance + decomposition | [`compute_wasserstein`] | W2 and per-axis stacked shares |
//!
//! ## Quick Start
//!
//! ```rust
//! use flamew2::{compute_wasserstein, W2Config};
//! use ndarray::array;
//!
//! // Four points, two scalar columns; the candidate is shifted on column 0.
//! let reference = array![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0], [3.0, 4.0]];
//! let candidate = array![[0.5, 1.0], [1.5, 2.0], [2.5, 3.0], [3.5, 4.0]];
//!
//! let config = W2Config { sample_size: 4, seed: Some(7) };
//! let result = compute_wasserstein(&reference, &candidate, &[0], &config)?;
//! assert!(result.distance > 0.0);
//! # Ok::<(), flamew2::Error>(())
//! ```
//!
//! ## Stacked decomposition
//!
//! For multi-axis comparisons the total squared transport cost is split into
//! per-axis shares by re-weighting the *same* optimal coupling with each axis's
//! own squared distances; no per-axis re-optimization. The shares are
//! normalized to sum to one (rounding drift is absorbed by the largest share)
//! and scaled by the distance, so the stacked vector sums back to W2.
//!
//! ## What Can Go Wrong
//!
//! 1. **Too few points**: the fixed-size subsample needs at least
//!    `sample_size` rows per cloud ([`Error::InsufficientSamples`]).
//! 2. **Constant scalars**: a selected axis with zero variance in the
//!    reference sample cannot be normalized ([`Error::DegenerateScale`]).
//! 3. **Identical clouds, multiple axes**: all per-axis contributions vanish
//!    and the shares are undefined ([`Error::ZeroContribution`]).
//! 4. **Stochastic subsampling**: results vary run to run unless
//!    [`W2Config::seed`] is fixed.
//!
//! ## References
//!
//! - Johnson, Wu & Ihme (2017). "Quantitative assessment of turbulent
//!   combustion models using the Wasserstein metric" (arXiv:1702.05539)
//! - Peyré & Cuturi (2019). "Computational Optimal Transport"

use ndarray::{Array1, Array2};
use std::time::Duration;
use thiserror::Error;

pub mod ground;
#[cfg(feature = "plot")]
pub mod plot;
pub mod sample;
pub mod solver;
pub mod stacked;
pub mod table;

pub use solver::{ExactSolver, TransportSolution, TransportSolver};
pub use table::ScalarTable;

/// Error variants for the comparison pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A cloud has fewer points than the requested sample size.
    #[error("requested {requested} samples but the cloud has only {available} points")]
    InsufficientSamples { requested: usize, available: usize },

    /// A selected axis has zero standard deviation in the reference sample.
    #[error("dimension {0} has zero standard deviation in the reference sample")]
    DegenerateScale(usize),

    /// The transport solver rejected its inputs or failed to make progress.
    #[error("transport solver failed: {0}")]
    SolverFailure(&'static str),

    /// The transport solver exceeded its configured time limit.
    #[error("transport solver exceeded its time limit of {0:?}")]
    SolverTimeout(Duration),

    /// All per-axis contributions are zero; proportions are undefined.
    #[error("all per-dimension contributions are zero; proportions are undefined")]
    ZeroContribution,

    /// Empty selector, duplicate indices, or an index out of column range.
    #[error("invalid dimension selector: {0}")]
    InvalidSelector(&'static str),

    /// Tables or matrices disagree on dimensionality.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(&'static str),

    /// Domain error (invalid inputs for the mathematical definition).
    #[error("{0}")]
    Domain(&'static str),

    /// CSV-layer failure while reading a table.
    #[error("failed to read table: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while reading a table.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A table field did not parse as a number.
    #[error("table parse error: {0}")]
    Parse(String),
}

/// Result type for comparison operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration for one Wasserstein comparison.
#[derive(Debug, Clone)]
pub struct W2Config {
    /// Number of points drawn (without replacement) from each cloud.
    pub sample_size: usize,
    /// RNG seed for the subsampling step. `None` seeds from entropy, so two
    /// runs over the same inputs will generally differ.
    pub seed: Option<u64>,
}

impl Default for W2Config {
    fn default() -> Self {
        Self {
            sample_size: 500,
            seed: None,
        }
    }
}

/// Per-axis breakdown of a multi-axis distance.
#[derive(Debug, Clone)]
pub enum Stacked {
    /// Single-axis comparison: the distance itself, no decomposition.
    Scalar(f64),
    /// Multi-axis comparison: one share per selector position, summing to the
    /// distance.
    PerAxis(Array1<f64>),
}

impl Stacked {
    /// Total across the decomposition; equals the distance in both variants.
    pub fn total(&self) -> f64 {
        match self {
            Stacked::Scalar(w) => *w,
            Stacked::PerAxis(shares) => shares.sum(),
        }
    }

    /// The per-axis shares, if this was a multi-axis comparison.
    pub fn per_axis(&self) -> Option<&Array1<f64>> {
        match self {
            Stacked::Scalar(_) => None,
            Stacked::PerAxis(shares) => Some(shares),
        }
    }
}

/// Outcome of one comparison: the distance, the optimal coupling that attained
/// it, and the stacked per-axis breakdown.
///
/// Consumers (plotting, reporting) treat all fields as read-only.
#[derive(Debug, Clone)]
pub struct WassersteinResult {
    /// W2 = sqrt(minimum total squared-distance transport cost).
    pub distance: f64,
    /// The optimal transport plan; row and column sums are each `1/N`.
    pub plan: Array2<f64>,
    /// The distance itself (one axis) or per-axis shares summing to it.
    pub stacked: Stacked,
}

/// Compute the 2-Wasserstein distance between two scalar point clouds with the
/// default exact solver.
///
/// `reference` and `candidate` are N×D row-major point clouds with the same
/// column count (rows need not match; both are subsampled to
/// `config.sample_size`). `selector` picks the compared axes by 0-based column
/// index.
///
/// See [`compute_wasserstein_with`] for the solver-generic version.
pub fn compute_wasserstein(
    reference: &Array2<f64>,
    candidate: &Array2<f64>,
    selector: &[usize],
    config: &W2Config,
) -> Result<WassersteinResult> {
    compute_wasserstein_with(&ExactSolver::default(), reference, candidate, selector, config)
}

/// Compute the 2-Wasserstein distance using the given transport solver.
///
/// The pipeline is strictly sequential: subsample and normalize both clouds,
/// build the squared ground-distance matrix over the selected axes, solve the
/// balanced transportation problem with uniform marginals, take the square
/// root of the optimal cost, and (for more than one axis) decompose the cost
/// into per-axis shares against the already-optimal plan.
pub fn compute_wasserstein_with(
    solver: &dyn TransportSolver,
    reference: &Array2<f64>,
    candidate: &Array2<f64>,
    selector: &[usize],
    config: &W2Config,
) -> Result<WassersteinResult> {
    if reference.ncols() != candidate.ncols() {
        return Err(Error::ShapeMismatch("tables must have the same column count"));
    }
    ground::validate_selector(selector, reference.ncols())?;
    if config.sample_size == 0 {
        return Err(Error::Domain("sample size must be positive"));
    }

    let mut rng = sample::rng_from_seed(config.seed);
    let pair = sample::draw_pair(reference, candidate, selector, config.sample_size, &mut rng)?;

    let sq_cost = ground::squared_cost_matrix(&pair.reference_norm, &pair.candidate_norm, selector)?;
    let n = config.sample_size;
    let weights = Array1::from_elem(n, 1.0 / n as f64);
    let solution = solver.solve(&sq_cost, &weights, &weights)?;
    let distance = solution.cost.sqrt();

    let stacked = if selector.len() > 1 {
        let contrib = stacked::axis_contributions(
            &solution.plan,
            &pair.reference_norm,
            &pair.candidate_norm,
            selector,
        )?;
        let proportions = stacked::proportions(&contrib)?;
        Stacked::PerAxis(proportions.mapv(|p| p * distance))
    } else {
        Stacked::Scalar(distance)
    };

    Ok(WassersteinResult {
        distance,
        plan: solution.plan,
        stacked,
    })
}

/// Run several independent comparisons over the same pair of clouds, one per
/// selector, in parallel.
///
/// Each comparison is stateless and receives its own subsample, so this is a
/// plain data-parallel map: `compute_many(..)[k]` equals
/// `compute_wasserstein(reference, candidate, &selectors[k], config)`.
pub fn compute_many(
    reference: &Array2<f64>,
    candidate: &Array2<f64>,
    selectors: &[&[usize]],
    config: &W2Config,
) -> Result<Vec<WassersteinResult>> {
    use rayon::prelude::*;

    selectors
        .par_iter()
        .map(|selector| compute_wasserstein(reference, candidate, selector, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::{Distribution, StandardNormal};

    fn gaussian_cloud(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cloud = Array2::zeros((rows, cols));
        for i in 0..rows {
            for k in 0..cols {
                cloud[[i, k]] = StandardNormal.sample(&mut rng);
            }
        }
        cloud
    }

    #[test]
    fn single_axis_skips_decomposition() {
        let reference = gaussian_cloud(60, 3, 1);
        let candidate = gaussian_cloud(60, 3, 2);
        let config = W2Config {
            sample_size: 40,
            seed: Some(9),
        };
        let result = compute_wasserstein(&reference, &candidate, &[1], &config).unwrap();
        match result.stacked {
            Stacked::Scalar(w) => assert_eq!(w, result.distance),
            Stacked::PerAxis(_) => panic!("single-axis comparison must not decompose"),
        }
    }

    #[test]
    fn stacked_shares_sum_to_distance() {
        let reference = gaussian_cloud(80, 3, 3);
        let mut candidate = gaussian_cloud(80, 3, 4);
        for v in candidate.column_mut(0).iter_mut() {
            *v += 1.0;
        }
        let config = W2Config {
            sample_size: 50,
            seed: Some(11),
        };
        let result = compute_wasserstein(&reference, &candidate, &[0, 2], &config).unwrap();
        let shares = result.stacked.per_axis().expect("multi-axis decomposition");
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|&s| s >= 0.0));
        assert!(
            (shares.sum() - result.distance).abs() < 1e-9,
            "stacked shares must sum to W2: {} vs {}",
            shares.sum(),
            result.distance
        );
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let reference = gaussian_cloud(70, 2, 5);
        let candidate = gaussian_cloud(90, 2, 6);
        let config = W2Config {
            sample_size: 45,
            seed: Some(123),
        };
        let a = compute_wasserstein(&reference, &candidate, &[0, 1], &config).unwrap();
        let b = compute_wasserstein(&reference, &candidate, &[0, 1], &config).unwrap();
        assert_eq!(a.distance, b.distance);
        assert_eq!(a.plan, b.plan);
    }

    #[test]
    fn mismatched_column_counts_are_rejected() {
        let reference = gaussian_cloud(30, 3, 7);
        let candidate = gaussian_cloud(30, 2, 8);
        let err = compute_wasserstein(&reference, &candidate, &[0], &W2Config::default());
        assert!(matches!(err, Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn zero_sample_size_is_rejected() {
        let reference = gaussian_cloud(10, 2, 9);
        let config = W2Config {
            sample_size: 0,
            seed: Some(0),
        };
        let err = compute_wasserstein(&reference, &reference, &[0], &config);
        assert!(matches!(err, Err(Error::Domain(_))));
    }

    #[test]
    fn compute_many_matches_sequential_calls() {
        let reference = gaussian_cloud(60, 4, 10);
        let candidate = gaussian_cloud(60, 4, 11);
        let config = W2Config {
            sample_size: 30,
            seed: Some(21),
        };
        let selectors: Vec<&[usize]> = vec![&[0], &[0, 1], &[0, 1, 2, 3]];
        let batch = compute_many(&reference, &candidate, &selectors, &config).unwrap();
        for (selector, result) in selectors.iter().zip(&batch) {
            let single = compute_wasserstein(&reference, &candidate, selector, &config).unwrap();
            assert_eq!(single.distance, result.distance);
        }
    }

    #[test]
    fn quick_start_shape() {
        // Mirror of the crate-level example with a non-trivial assertion on
        // the plan shape.
        let reference = array![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0], [3.0, 4.0]];
        let candidate = array![[0.5, 1.0], [1.5, 2.0], [2.5, 3.0], [3.5, 4.0]];
        let config = W2Config {
            sample_size: 4,
            seed: Some(7),
        };
        let result = compute_wasserstein(&reference, &candidate, &[0], &config).unwrap();
        assert_eq!(result.plan.shape(), &[4, 4]);
        assert!(result.distance > 0.0);
    }

    proptest! {
        #[test]
        fn plan_marginals_are_uniform(
            seed in 0u64..1000,
            n in 5usize..20,
        ) {
            let reference = gaussian_cloud(n + 10, 2, seed);
            let candidate = gaussian_cloud(n + 15, 2, seed.wrapping_add(1));
            let config = W2Config { sample_size: n, seed: Some(seed) };
            // Gaussian clouds almost surely have nonzero per-axis contributions.
            let result = compute_wasserstein(&reference, &candidate, &[0, 1], &config).unwrap();
            let expected = 1.0 / n as f64;
            for i in 0..n {
                prop_assert!((result.plan.row(i).sum() - expected).abs() < 1e-6);
                prop_assert!((result.plan.column(i).sum() - expected).abs() < 1e-6);
            }
        }

        #[test]
        fn distance_is_nonnegative_and_finite(
            seed in 0u64..1000,
        ) {
            let reference = gaussian_cloud(25, 3, seed);
            let candidate = gaussian_cloud(25, 3, seed.wrapping_add(7));
            let config = W2Config { sample_size: 15, seed: Some(seed) };
            let result = compute_wasserstein(&reference, &candidate, &[0, 1, 2], &config).unwrap();
            prop_assert!(result.distance.is_finite());
            prop_assert!(result.distance >= 0.0);
        }
    }
}
