//! Euclidean centroid calculation for K-Means clustering
//! Implements centroid recalculation by computing the mean (average) of all points in each cluster

use std::collections::BTreeSet;

use crate::{
    dataset::Dataset,
    error::{KmeansError, Result},
    params::EmptyClusterPolicy,
    types::{Assignment, Centroid, EuclideanDistance, KmeansValue},
};

/// Recalculate cluster centroids using Euclidean mean (arithmetic average)
///
/// # Arguments
/// * `data` - All data points
/// * `centroids` - Centroid slots, updated in place
/// * `assigned` - Point identifier -> slot from the preceding Assign step
/// * `policy` - How to treat a slot that received no points
/// * `iteration` - Current round, only used for error reporting
///
/// # Returns
/// * The largest distance any slot moved in this update
///
/// # Algorithm
/// 1. Sum all data points in each cluster
/// 2. Divide by the count of points in each cluster to get the mean
/// 3. Resolve empty slots according to `policy`
pub fn euclidean_recalculate(
    data: &Dataset,
    centroids: &mut [Centroid],
    assigned: &Assignment,
    policy: EmptyClusterPolicy,
    iteration: usize,
) -> Result<f64> {
    let mut sums: Vec<Vec<f64>> = vec![Vec::<f64>::zero(data.dim()); centroids.len()];
    let mut counts: Vec<usize> = vec![0; centroids.len()];

    // Step 1: Sum all data points within each cluster
    for (id, row) in data.iter() {
        if let Some(&cluster) = assigned.get(&id) {
            sums[cluster].add_by_field(row);
            counts[cluster] += 1;
        }
    }

    // Step 2: Divide each non-empty cluster's sum by its count
    let means: Vec<Option<Vec<f64>>> = sums.iter().zip(counts.iter())
        .map(|(sum, count)| (*count > 0).then(|| sum.div_by_n(*count)))
        .collect();
    let empty: Vec<usize> = means.iter().enumerate()
        .filter_map(|(slot, mean)| mean.is_none().then_some(slot))
        .collect();

    // Nothing is written back if the round is going to fail
    if let (EmptyClusterPolicy::Fail, Some(&slot)) = (policy, empty.first()) {
        return Err(KmeansError::DegenerateAssignment { slot, iteration });
    }

    let mut max_shift: f64 = 0.0;
    for (centroid, mean) in centroids.iter_mut().zip(means) {
        if let Some(mean) = mean {
            max_shift = max_shift.max(centroid.coords.euclidean_distance(&mean));
            centroid.coords = mean;
        }
    }

    // Step 3: Empty slots
    if empty.is_empty() {
        return Ok(max_shift);
    }
    match policy {
        EmptyClusterPolicy::Fail => {}
        EmptyClusterPolicy::Keep => {
            log::warn!("slots {:?} received no points at iteration {}, keeping them in place", empty, iteration);
        }
        EmptyClusterPolicy::Reseed => {
            let mut taken: BTreeSet<usize> = BTreeSet::new();
            for slot in empty {
                let Some((id, coords)) = farthest_point(data, centroids, &taken) else {
                    continue;
                };
                log::warn!("slot {} received no points at iteration {}, reseeding from point {}", slot, iteration, id);
                max_shift = max_shift.max(centroids[slot].coords.euclidean_distance(&coords));
                centroids[slot].coords = coords;
                taken.insert(id);
            }
        }
    }

    Ok(max_shift)
}

/// Point whose nearest centroid is farthest away, skipping `taken`.
/// Ties go to the lowest identifier.
fn farthest_point(
    data: &Dataset,
    centroids: &[Centroid],
    taken: &BTreeSet<usize>,
) -> Option<(usize, Vec<f64>)> {
    let mut best: Option<(usize, f64)> = None;
    for (id, row) in data.iter().filter(|(id, _)| !taken.contains(id)) {
        let nearest = centroids.iter()
            .map(|c| row.euclidean_distance(&c.coords))
            .fold(f64::INFINITY, f64::min);
        if best.is_none_or(|(_, d)| nearest > d) {
            best = Some((id, nearest));
        }
    }
    best.and_then(|(id, _)| data.get(id).map(|coords| (id, coords.clone())))
}
