//! K-Means++ initialization algorithm
//! Implements the K-Means++ algorithm for smart initial centroid selection
//! which improves clustering quality and convergence speed

use std::collections::BTreeSet;

use rand::{RngExt, seq::IndexedRandom};
use rand_chacha::ChaCha20Rng;

use crate::{
    dataset::Dataset,
    error::{KmeansError, Result},
    params::SeedingFallback,
    types::{Centroid, EuclideanDistance},
};

/// Initialize cluster centroids using the K-Means++ algorithm
///
/// K-Means++ selects initial centroids with probability proportional to their
/// (linear) Euclidean distance from the nearest already chosen centroid,
/// spreading them out across the data space.
///
/// # Arguments
/// * `data` - Dataset to draw seeds from
/// * `k` - Number of centroids to choose, `1 < k < data.len()`
/// * `fallback` - What to do when every remaining candidate has zero weight
/// * `rng` - Generator handle; the caller owns it so runs stay reproducible
///
/// # Returns
/// * `k` centroids in the order they were chosen, each remembering its seed identifier
///
/// # Algorithm
/// 1. Choose first centroid uniformly at random among all identifiers
/// 2. For each remaining centroid:
///    - Calculate distance from each not-yet-chosen point to its nearest chosen centroid
///    - Choose next centroid with probability proportional to that distance
///    - Remove it from the candidates
pub fn set_centroid_by_data(
    data: &Dataset,
    k: usize,
    fallback: SeedingFallback,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<Centroid>> {
    if !(1 < k && k < data.len()) {
        return Err(KmeansError::InvalidClusterCount { requested: k, n_points: data.len() });
    }

    let mut res_centroids: Vec<Centroid> = Vec::with_capacity(k);

    // Sorted identifiers, so the uniform draw does not depend on insertion order
    let vec_idx = data.ids();
    let mut not_chosen: BTreeSet<usize> = vec_idx.iter().copied().collect();

    // Step 1: Select first centroid uniformly at random
    let first_index = *vec_idx.choose(rng).ok_or(KmeansError::NotEnoughPoints(0))?;
    push_seed(data, first_index, &mut res_centroids, &mut not_chosen);
    log::debug!("{:<32}{:<16}", "first seed", first_index);

    // Step 2: Select remaining k-1 centroids
    while res_centroids.len() < k {
        let (candidates, rows): (Vec<usize>, Vec<&Vec<f64>>) = data.iter()
            .filter(|(id, _)| not_chosen.contains(id))
            .unzip();

        // D(point): distance to the nearest chosen centroid
        let distances: Vec<f64> = rows.iter()
            .map(|row| res_centroids.iter()
                .map(|centroid| row.euclidean_distance(&centroid.coords))
                .fold(f64::INFINITY, f64::min))
            .collect();

        let total_distance: f64 = distances.iter().sum();
        if !total_distance.is_finite() {
            return Err(KmeansError::NonFiniteSeedingWeights { chosen: res_centroids.len() });
        }

        let selected_index = if total_distance > 0.0 {
            // P(point) = D(point) / sum(D)
            let probabilities: Vec<f64> = distances.iter().map(|d| d / total_distance).collect();
            weighted_choice(&candidates, &probabilities, rng)
                .ok_or(KmeansError::NonFiniteSeedingWeights { chosen: res_centroids.len() })?
        } else {
            match fallback {
                SeedingFallback::Uniform => {
                    log::warn!(
                        "all {} remaining candidates coincide with a chosen centroid, drawing uniformly",
                        candidates.len()
                    );
                    *candidates.choose(rng).ok_or(KmeansError::NotEnoughPoints(0))?
                }
                SeedingFallback::Fail => {
                    return Err(KmeansError::DegenerateSeedingWeights { chosen: res_centroids.len() });
                }
            }
        };
        log::debug!("{:<32}{:<16}", "next seed", selected_index);

        push_seed(data, selected_index, &mut res_centroids, &mut not_chosen);
    }

    Ok(res_centroids)
}

fn push_seed(
    data: &Dataset,
    identifier: usize,
    centroids: &mut Vec<Centroid>,
    not_chosen: &mut BTreeSet<usize>,
) {
    if let Some(coords) = data.get(identifier) {
        centroids.push(Centroid::new(Some(identifier), coords.clone()));
        not_chosen.remove(&identifier);
    }
}

/// Draw one of `candidates` given an explicit probability vector
///
/// Walks the cumulative distribution until it passes a uniform draw over the
/// probability total. Rounding can leave the total a hair under the draw, so
/// the last candidate doubles as the fallback. `None` when `candidates` is
/// empty or the total is not a finite positive number.
pub(crate) fn weighted_choice(candidates: &[usize], probabilities: &[f64], rng: &mut ChaCha20Rng) -> Option<usize> {
    let prob_total: f64 = probabilities.iter().sum();
    if !(prob_total.is_finite() && prob_total > 0.0) {
        return None;
    }
    let rand_val: f64 = rng.random_range(0.0..prob_total);

    let mut cumulative = 0.0;
    for (id, prob) in candidates.iter().zip(probabilities.iter()) {
        cumulative += prob;
        if rand_val < cumulative {
            return Some(*id);
        }
    }
    candidates.last().copied()
}
