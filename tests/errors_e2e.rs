use flamew2::{compute_wasserstein, compute_wasserstein_with, Error, ExactSolver, W2Config};
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use std::time::Duration;

fn gaussian_cloud(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cloud = Array2::zeros((rows, cols));
    for v in cloud.iter_mut() {
        *v = StandardNormal.sample(&mut rng);
    }
    cloud
}

#[test]
fn insufficient_samples_is_reported() {
    let reference = gaussian_cloud(10, 2, 91);
    let candidate = gaussian_cloud(50, 2, 92);
    let config = W2Config {
        sample_size: 20,
        seed: Some(1),
    };

    let err = compute_wasserstein(&reference, &candidate, &[0], &config);
    assert!(matches!(
        err,
        Err(Error::InsufficientSamples {
            requested: 20,
            available: 10
        })
    ));
}

#[test]
fn degenerate_scale_is_reported_for_a_constant_column() {
    let mut reference = gaussian_cloud(60, 2, 93);
    for v in reference.column_mut(1).iter_mut() {
        *v = 42.0;
    }
    let candidate = gaussian_cloud(60, 2, 94);
    let config = W2Config {
        sample_size: 40,
        seed: Some(2),
    };

    let err = compute_wasserstein(&reference, &candidate, &[0, 1], &config);
    assert!(matches!(err, Err(Error::DegenerateScale(1))), "{err:?}");

    // The same constant column is harmless when it is not selected.
    let ok = compute_wasserstein(&reference, &candidate, &[0], &config);
    assert!(ok.is_ok());
}

#[test]
fn invalid_selectors_are_reported() {
    let reference = gaussian_cloud(30, 3, 95);
    let candidate = gaussian_cloud(30, 3, 96);
    let config = W2Config {
        sample_size: 20,
        seed: Some(3),
    };

    for selector in [&[][..], &[0, 0][..], &[3][..]] {
        let err = compute_wasserstein(&reference, &candidate, selector, &config);
        assert!(
            matches!(err, Err(Error::InvalidSelector(_))),
            "selector {selector:?} must be rejected, got {err:?}"
        );
    }
}

#[test]
fn mismatched_tables_are_reported() {
    let reference = gaussian_cloud(30, 3, 97);
    let candidate = gaussian_cloud(30, 4, 98);
    let err = compute_wasserstein(&reference, &candidate, &[0], &W2Config::default());
    assert!(matches!(err, Err(Error::ShapeMismatch(_))));
}

#[test]
fn solver_timeout_propagates_to_the_caller() {
    let reference = gaussian_cloud(60, 2, 99);
    let candidate = gaussian_cloud(60, 2, 100);
    let config = W2Config {
        sample_size: 40,
        seed: Some(4),
    };

    let solver = ExactSolver::with_time_limit(Duration::ZERO);
    let err = compute_wasserstein_with(&solver, &reference, &candidate, &[0, 1], &config);
    assert!(matches!(err, Err(Error::SolverTimeout(_))), "{err:?}");
}
