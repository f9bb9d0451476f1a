//! Elbow method for picking K
//!
//! Fits the model for every K in `1..=max_k`, records the total within-cluster
//! distance and marks the K where the curve bends the most.

use std::path::Path;

use anyhow::{Result, anyhow};
use kmeans::{Assignment, Dataset, KmeansParams, KmeansPlusPlus, fit, metrics};
use plotlib::{
    page::Page,
    repr::Plot,
    style::{LineJoin, LineStyle, PointMarker, PointStyle},
    view::ContinuousView,
};
use rayon::prelude::*;

/// `(k, inertia)` for every `k` in `1..=max_k`, capped at `N - 1`.
///
/// `k = 1` is the distance to the dataset mean. Every other `k` runs a full
/// fit with its own generator seeded from `seed + k`, so the values do not
/// depend on the order rayon evaluates them in.
pub fn inertia_curve(
    data: &Dataset,
    max_k: usize,
    max_iteration: usize,
    epsilon: f64,
    seed: u64,
) -> Result<Vec<(usize, f64)>> {
    let max_k = max_k.min(data.len() - 1);

    (1..=max_k).into_par_iter()
        .map(|k| {
            if k == 1 {
                let centroid = metrics::mean(data);
                let assigned: Assignment = data.ids().into_iter().map(|id| (id, 0)).collect();
                return Ok((k, metrics::inertia(data, &[centroid], &assigned)));
            }
            let params = KmeansParams::new(k, max_iteration, epsilon)?.with_seed(seed.wrapping_add(k as u64));
            let report = fit(data, &mut KmeansPlusPlus::new(params))?;
            log::info!("{:<32}k={} inertia={:.4}", "elbow sweep", k, report.inertia);
            Ok((k, report.inertia))
        })
        .collect()
}

/// Point of the curve farthest from the chord joining its first and last
/// points, with both axes scaled to `[0, 1]` first.
pub fn find_elbow(curve: &[(usize, f64)]) -> Option<(usize, f64)> {
    let (first, last) = (*curve.first()?, *curve.last()?);
    if curve.len() < 3 {
        return Some(first);
    }

    let (k_min, k_max) = (first.0 as f64, last.0 as f64);
    let i_min = curve.iter().map(|(_, i)| *i).fold(f64::INFINITY, f64::min);
    let i_max = curve.iter().map(|(_, i)| *i).fold(f64::NEG_INFINITY, f64::max);
    if i_max - i_min <= 0.0 || k_max - k_min <= 0.0 {
        return Some(first);
    }
    let scale = |(k, i): (usize, f64)| ((k as f64 - k_min) / (k_max - k_min), (i - i_min) / (i_max - i_min));

    let (x0, y0) = scale(first);
    let (x1, y1) = scale(last);
    let chord = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

    curve.iter()
        .map(|point| {
            let (x, y) = scale(*point);
            let distance = ((x1 - x0) * (y0 - y) - (x0 - x) * (y1 - y0)).abs() / chord;
            (*point, distance)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(point, _)| point)
}

/// Inertia versus K as an SVG line with the elbow circled
pub fn plot_curve(curve: &[(usize, f64)], elbow: (usize, f64), path: &Path) -> Result<()> {
    let line = Plot::new(curve.iter().map(|(k, i)| (*k as f64, *i)).collect()).line_style(
        LineStyle::new()
            .colour("#3355DD")
            .linejoin(LineJoin::Round).width(2.0),
    );
    let marker = Plot::new(vec![(elbow.0 as f64, elbow.1)]).point_style(
        PointStyle::new()
            .marker(PointMarker::Circle)
            .colour("#DD3355")
            .size(6.0),
    );
    let v = ContinuousView::new()
        .add(line)
        .add(marker)
        .x_label("k")
        .y_label("Inertia");

    Page::single(&v).save(path).map_err(|e| anyhow!("saving {}: {}", path.display(), e))?;
    log::info!("{:<32}{}", "saved elbow plot", path.display());
    Ok(())
}
