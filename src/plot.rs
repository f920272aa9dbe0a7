//! SVG rendering of comparison results.
//!
//! Three figures cover the reporting needs of a scalar-distribution
//! comparison: overlaid histograms for one axis, a normalized scatter for two
//! axes, and stacked bars showing each axis's share of several W2 values.
//! Everything here consumes pipeline outputs read-only; no rendering state
//! leaks back into the numeric core.

use ndarray::ArrayView1;
use plotters::prelude::*;
use std::path::Path;

/// Rendering result; plotters backends carry their own error types.
pub type PlotResult = std::result::Result<(), Box<dyn std::error::Error>>;

const BINS: usize = 20;

fn value_range(values: &[ArrayView1<f64>]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for column in values {
        for &v in column.iter() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo <= f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn density_bins(values: ArrayView1<f64>, lo: f64, width: f64) -> Vec<f64> {
    let mut counts = vec![0usize; BINS];
    for &v in values.iter() {
        let k = (((v - lo) / width) as usize).min(BINS - 1);
        counts[k] += 1;
    }
    let norm = values.len() as f64 * width;
    counts.iter().map(|&c| c as f64 / norm).collect()
}

/// Overlaid density histograms of one unnormalized scalar column from each
/// cloud, annotated with the computed distance.
pub fn histogram_comparison(
    path: impl AsRef<Path>,
    reference: ArrayView1<f64>,
    candidate: ArrayView1<f64>,
    axis_label: &str,
    w2: f64,
) -> PlotResult {
    if reference.is_empty() || candidate.is_empty() {
        return Err("histogram requires non-empty samples".into());
    }

    let (lo, hi) = value_range(&[reference, candidate]);
    let width = (hi - lo) / BINS as f64;
    let ref_density = density_bins(reference, lo, width);
    let cand_density = density_bins(candidate, lo, width);
    let y_max = ref_density
        .iter()
        .chain(cand_density.iter())
        .cloned()
        .fold(0.0, f64::max)
        * 1.1;

    let root = SVGBackend::new(path.as_ref(), (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("W2 = {w2:.3}"), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc(axis_label)
        .y_desc("density")
        .draw()?;

    chart
        .draw_series(ref_density.iter().enumerate().map(|(k, &d)| {
            let x0 = lo + k as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, d)], BLUE.mix(0.5).filled())
        }))?
        .label("experiment")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.mix(0.5).filled()));
    chart
        .draw_series(cand_density.iter().enumerate().map(|(k, &d)| {
            let x0 = lo + k as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, d)], RED.mix(0.5).filled())
        }))?
        .label("simulation")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RED.mix(0.5).filled()));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Scatter of two normalized axes, reference (blue) vs candidate (red).
pub fn scatter_comparison(
    path: impl AsRef<Path>,
    reference_x: ArrayView1<f64>,
    reference_y: ArrayView1<f64>,
    candidate_x: ArrayView1<f64>,
    candidate_y: ArrayView1<f64>,
    axis_labels: (&str, &str),
    w2: f64,
) -> PlotResult {
    if reference_x.len() != reference_y.len() || candidate_x.len() != candidate_y.len() {
        return Err("scatter requires matched x/y columns".into());
    }

    let (x_lo, x_hi) = value_range(&[reference_x, candidate_x]);
    let (y_lo, y_hi) = value_range(&[reference_y, candidate_y]);
    let x_pad = (x_hi - x_lo) * 0.05;
    let y_pad = (y_hi - y_lo) * 0.05;

    let root = SVGBackend::new(path.as_ref(), (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("W2 = {w2:.3}"), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo - x_pad..x_hi + x_pad, y_lo - y_pad..y_hi + y_pad)?;
    chart
        .configure_mesh()
        .x_desc(format!("{} (normalized)", axis_labels.0))
        .y_desc(format!("{} (normalized)", axis_labels.1))
        .draw()?;

    chart
        .draw_series(
            reference_x
                .iter()
                .zip(reference_y.iter())
                .map(|(&x, &y)| Circle::new((x, y), 3, &BLUE)),
        )?
        .label("experiment")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, &BLUE));
    chart
        .draw_series(
            candidate_x
                .iter()
                .zip(candidate_y.iter())
                .map(|(&x, &y)| Circle::new((x, y), 3, &RED)),
        )?
        .label("simulation")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, &RED));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Stacked bars: one bar per comparison, segments showing each axis's share
/// of that comparison's W2. Missing trailing shares render as zero.
pub fn stacked_bars(
    path: impl AsRef<Path>,
    axis_names: &[&str],
    rows: &[(&str, Vec<f64>)],
) -> PlotResult {
    if rows.is_empty() || axis_names.is_empty() {
        return Err("stacked bars require at least one row and one axis".into());
    }
    let y_max = rows
        .iter()
        .map(|(_, shares)| shares.iter().sum::<f64>())
        .fold(0.0, f64::max)
        * 1.1;
    if y_max <= 0.0 {
        return Err("stacked bars require a positive total".into());
    }

    let root = SVGBackend::new(path.as_ref(), (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..rows.len() as f64, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc("comparison")
        .y_desc("W2, stacked")
        .disable_x_mesh()
        .draw()?;

    for (k, &axis) in axis_names.iter().enumerate() {
        let color = Palette99::pick(k).to_rgba();
        chart
            .draw_series(rows.iter().enumerate().filter_map(|(i, (_, shares))| {
                let share = *shares.get(k)?;
                let base: f64 = shares[..k].iter().sum();
                Some(Rectangle::new(
                    [(i as f64 + 0.15, base), (i as f64 + 0.85, base + share)],
                    color.filled(),
                ))
            }))?
            .label(axis)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}
