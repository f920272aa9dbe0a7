use flamew2::{compute_wasserstein, sample, Error, ExactSolver, TransportSolver, W2Config};
use flamew2::{ground, Stacked};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

fn gaussian_cloud(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cloud = Array2::zeros((rows, cols));
    for v in cloud.iter_mut() {
        *v = StandardNormal.sample(&mut rng);
    }
    cloud
}

#[test]
fn identical_tables_have_zero_distance() {
    let cloud = gaussian_cloud(120, 3, 51);
    // Sampling the full table makes both subsamples the same multiset (in
    // different orders), so the optimal transport cost is exactly zero.
    let config = W2Config {
        sample_size: 120,
        seed: Some(3),
    };

    let result = compute_wasserstein(&cloud, &cloud, &[0], &config).unwrap();
    assert!(
        result.distance < 1e-9,
        "identical clouds must have W2 ~ 0, got {}",
        result.distance
    );
    match result.stacked {
        Stacked::Scalar(w) => assert!(w < 1e-9),
        Stacked::PerAxis(_) => panic!("single-axis comparison must not decompose"),
    }
}

#[test]
fn identical_clouds_in_the_same_order_give_the_diagonal_plan() {
    // Drive the pipeline stages directly so both sides keep the same row
    // order; the optimal coupling is then the scaled identity.
    let cloud = gaussian_cloud(60, 2, 52);
    let selector = [0usize, 1];
    let scale = sample::column_std(&cloud);
    let normalized = sample::normalize(&cloud, &scale, &selector).unwrap();

    let sq_cost = ground::squared_cost_matrix(&normalized, &normalized, &selector).unwrap();
    let n = normalized.nrows();
    let weights = Array1::from_elem(n, 1.0 / n as f64);
    let solution = ExactSolver::default().solve(&sq_cost, &weights, &weights).unwrap();

    assert!(solution.cost.abs() < 1e-12);
    let expected = 1.0 / n as f64;
    for i in 0..n {
        for j in 0..n {
            let want = if i == j { expected } else { 0.0 };
            assert!(
                (solution.plan[[i, j]] - want).abs() < 1e-9,
                "plan[{i}][{j}] = {}, expected {want}",
                solution.plan[[i, j]]
            );
        }
    }
}

#[test]
fn identical_tables_with_multiple_axes_raise_zero_contribution() {
    let cloud = gaussian_cloud(80, 2, 53);
    let config = W2Config {
        sample_size: 80,
        seed: Some(4),
    };

    let err = compute_wasserstein(&cloud, &cloud, &[0, 1], &config);
    assert!(
        matches!(err, Err(Error::ZeroContribution)),
        "expected ZeroContribution, got {err:?}"
    );
}
