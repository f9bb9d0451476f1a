use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::{
    dataset::Dataset,
    error::Result,
    euclidean_centers::euclidean_recalculate,
    init_plusplus::set_centroid_by_data,
    metrics::{inertia, sum_of_squares},
    params::KmeansParams,
    types::{Assignment, Centroid, EuclideanDistance, FitReport},
};

// K-Means++ model: the validated parameters, the K centroid slots and the
// generator the seeding draws from. The generator is owned here and lent to
// the seeder, so two models with the same seed never share random state.
#[derive(Clone, Debug)]
pub struct KmeansPlusPlus {
    pub params: KmeansParams,
    pub centroid: Vec<Centroid>,
    rng: ChaCha20Rng,
}

/// Outcome of one Assign -> Update round
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub assigned: Assignment,
    /// Sum of squared distances at the Assign step, before the update
    pub sse: f64,
    /// Largest distance any centroid moved during the update
    pub shift: f64,
}

impl KmeansPlusPlus {
    pub fn new(params: KmeansParams) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(params.seed);
        Self { params, centroid: Vec::new(), rng }
    }

    /// Start from known centroids instead of seeding
    pub fn with_centroids(params: KmeansParams, centroid: Vec<Centroid>) -> Self {
        Self { centroid, ..Self::new(params) }
    }

    /// Run the K-Means++ seeder and install its picks as the centroid slots.
    /// Returns the seed identifiers in the order they were chosen.
    pub fn seed(&mut self, data: &Dataset) -> Result<Vec<usize>> {
        self.params.check_cluster_count(data.len())?;
        self.centroid = set_centroid_by_data(data, self.params.k, self.params.seeding_fallback, &mut self.rng)?;
        Ok(self.centroid.iter().filter_map(|c| c.seed_id).collect())
    }

    /// One Assign -> Update round over the current centroids
    pub fn step(&mut self, data: &Dataset, iteration: usize) -> Result<Round> {
        let assigned = assign_points(data, &self.centroid);
        let sse = sum_of_squares(data, &self.coordinates(), &assigned);
        let shift = euclidean_recalculate(data, &mut self.centroid, &assigned, self.params.empty_cluster, iteration)?;
        Ok(Round { assigned, sse, shift })
    }

    /// Current coordinates, one vector per slot
    pub fn coordinates(&self) -> Vec<Vec<f64>> {
        self.centroid.iter().map(|c| c.coords.clone()).collect()
    }
}

/// Fit the model to the data: K-Means++ seeding, then Lloyd rounds until the
/// largest centroid move drops below `epsilon` or `max_iteration` rounds ran.
pub fn fit(data: &Dataset, model: &mut KmeansPlusPlus) -> Result<FitReport> {
    let fit_timer = Instant::now();
    let seeds = model.seed(data)?;
    log::info!("{:<32}{:?}", "seeded kmeans++", seeds);

    let mut sse_history: Vec<f64> = Vec::new();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < model.params.max_iteration && !converged {
        let iteration_timer = Instant::now();
        let round = model.step(data, iterations)?;
        iterations += 1;
        sse_history.push(round.sse);
        converged = round.shift < model.params.epsilon;
        log::debug!(
            "iteration {:>4} | sse {:>14.6} | shift {:>12.6} | {:?}",
            iterations, round.sse, round.shift, iteration_timer.elapsed()
        );
    }

    let centroids = model.coordinates();
    let assigned = assign_points(data, &model.centroid);
    let inertia = inertia(data, &centroids, &assigned);
    log::info!(
        "{:<32}k={} iterations={} converged={} inertia={:.4} in {:?}",
        "finished kmeans", model.params.k, iterations, converged, inertia, fit_timer.elapsed()
    );

    Ok(FitReport { seeds, centroids, iterations, converged, assigned, sse_history, inertia })
}

/// Nearest-centroid assignment. Comparison is a strict `<`, so on equal
/// distances the lowest slot wins.
pub fn assign_points(data: &Dataset, centroids: &[Centroid]) -> Assignment {
    data.iter()
        .map(|(id, row)| {
            let mut min_slot = 0;
            let mut min_distance = f64::INFINITY;
            for (slot, centroid) in centroids.iter().enumerate() {
                let distance = row.euclidean_distance(&centroid.coords);
                if distance < min_distance {
                    min_distance = distance;
                    min_slot = slot;
                }
            }
            (id, min_slot)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand_distr::{Distribution, Normal};

    use super::*;
    use crate::{error::KmeansError, params::EmptyClusterPolicy};

    fn five_points() -> Dataset {
        Dataset::new(vec![
            (1, vec![0.0, 0.0]),
            (2, vec![0.0, 1.0]),
            (3, vec![10.0, 10.0]),
            (4, vec![10.0, 11.0]),
            (5, vec![5.0, 5.0]),
        ]).unwrap()
    }

    fn blobs(seed: u64) -> Dataset {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 0.5).unwrap();
        let centers = [(0.0, 0.0), (8.0, 0.0), (4.0, 8.0)];
        let rows = (0..60)
            .map(|i| {
                let (cx, cy) = centers[i % 3];
                vec![cx + noise.sample(&mut rng), cy + noise.sample(&mut rng)]
            })
            .collect();
        Dataset::from_vec(rows).unwrap()
    }

    fn mean_of(data: &Dataset, ids: &[usize]) -> Vec<f64> {
        let mut sum = vec![0.0; data.dim()];
        for id in ids {
            for (s, c) in sum.iter_mut().zip(data.get(*id).unwrap()) {
                *s += c;
            }
        }
        sum.iter().map(|s| s / ids.len() as f64).collect()
    }

    #[test]
    fn two_natural_clusters_whichever_is_seeded_first() {
        let data = five_points();
        let low = [mean_of(&data, &[1, 2]), mean_of(&data, &[1, 2, 5])];
        let high = [mean_of(&data, &[3, 4]), mean_of(&data, &[3, 4, 5])];

        for seed in 0..25 {
            let params = KmeansParams::new(2, 300, 0.001).unwrap().with_seed(seed);
            let mut model = KmeansPlusPlus::new(params);
            let report = fit(&data, &mut model).unwrap();

            assert!(report.converged);
            assert_eq!(report.assigned[&1], report.assigned[&2]);
            assert_eq!(report.assigned[&3], report.assigned[&4]);
            assert_ne!(report.assigned[&1], report.assigned[&3]);

            let slot_low = report.assigned[&1];
            let slot_high = report.assigned[&3];
            assert!(low.contains(&report.centroids[slot_low]), "seed {}: {:?}", seed, report.centroids);
            assert!(high.contains(&report.centroids[slot_high]), "seed {}: {:?}", seed, report.centroids);

            // point 5 ends with the nearer centroid
            let p5 = data.get(5).unwrap();
            let to_low = p5.euclidean_distance(&report.centroids[slot_low]);
            let to_high = p5.euclidean_distance(&report.centroids[slot_high]);
            let expected = if to_low < to_high { slot_low } else { slot_high };
            assert_eq!(report.assigned[&5], expected);
        }
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let data = blobs(11);
        let run = || {
            let params = KmeansParams::new(3, 300, 0.0001).unwrap().with_seed(99);
            fit(&data, &mut KmeansPlusPlus::new(params)).unwrap()
        };
        let left = run();
        let right = run();
        assert_eq!(left.seeds, right.seeds);
        assert_eq!(left.centroids, right.centroids);
        assert_eq!(left.iterations, right.iterations);
    }

    #[test]
    fn squared_error_never_increases() {
        for seed in 0..10 {
            let data = blobs(seed);
            let params = KmeansParams::new(4, 300, 0.0).unwrap().with_seed(seed);
            let report = fit(&data, &mut KmeansPlusPlus::new(params)).unwrap();
            for pair in report.sse_history.windows(2) {
                assert!(pair[1] <= pair[0] + 1e-9, "seed {}: {:?}", seed, report.sse_history);
            }
        }
    }

    #[test]
    fn points_within_epsilon_stop_after_first_round() {
        let data = Dataset::from_vec(vec![
            vec![0.0, 0.0],
            vec![0.0, 0.0001],
            vec![0.0001, 0.0],
            vec![0.0001, 0.0001],
        ]).unwrap();
        let params = KmeansParams::new(2, 300, 0.01).unwrap();
        let report = fit(&data, &mut KmeansPlusPlus::new(params)).unwrap();
        assert_eq!(report.iterations, 1);
        assert!(report.converged);
    }

    #[test]
    fn stops_at_max_iteration() {
        let data = blobs(3);
        let params = KmeansParams::new(5, 2, 0.0).unwrap();
        let report = fit(&data, &mut KmeansPlusPlus::new(params)).unwrap();
        assert!(report.iterations <= 2);
        assert_eq!(report.sse_history.len(), report.iterations);
    }

    #[test]
    fn one_round_gives_exact_means() {
        let data = Dataset::new(vec![
            (1, vec![0.0, 0.0]),
            (2, vec![0.0, 2.0]),
            (3, vec![6.0, 6.0]),
            (4, vec![8.0, 6.0]),
        ]).unwrap();
        let start = vec![
            Centroid::new(Some(1), vec![0.0, 0.0]),
            Centroid::new(Some(4), vec![8.0, 6.0]),
        ];
        let mut model = KmeansPlusPlus::with_centroids(KmeansParams::new(2, 300, 0.0).unwrap(), start);
        let round = model.step(&data, 0).unwrap();

        assert_eq!(round.assigned, [(1, 0), (2, 0), (3, 1), (4, 1)].into_iter().collect());
        assert_eq!(model.coordinates(), vec![vec![0.0, 1.0], vec![7.0, 6.0]]);
        assert_eq!(round.shift, 1.0);
    }

    #[test]
    fn ties_go_to_first_slot() {
        let data = Dataset::from_vec(vec![vec![0.0], vec![2.0]]).unwrap();
        let centroids = vec![
            Centroid::new(None, vec![1.0]),
            Centroid::new(None, vec![1.0]),
        ];
        let assigned = assign_points(&data, &centroids);
        assert_eq!(assigned.values().copied().collect::<Vec<_>>(), vec![0, 0]);
    }

    #[test]
    fn empty_cluster_can_be_fatal() {
        let data = Dataset::from_vec(vec![vec![0.0], vec![2.0], vec![4.0]]).unwrap();
        let start = vec![
            Centroid::new(None, vec![2.0]),
            Centroid::new(None, vec![2.0]),
        ];
        let params = KmeansParams::new(2, 300, 0.0).unwrap().with_empty_cluster(EmptyClusterPolicy::Fail);
        let mut model = KmeansPlusPlus::with_centroids(params, start);
        assert_eq!(
            model.step(&data, 0),
            Err(KmeansError::DegenerateAssignment { slot: 1, iteration: 0 })
        );
    }

    #[test]
    fn k_must_be_below_point_count() {
        let data = five_points();
        let params = KmeansParams::new(5, 300, 0.001).unwrap();
        assert_eq!(
            fit(&data, &mut KmeansPlusPlus::new(params)).unwrap_err(),
            KmeansError::InvalidClusterCount { requested: 5, n_points: 5 }
        );
    }
}
