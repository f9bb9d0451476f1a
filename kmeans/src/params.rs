use serde::Serialize;

use crate::error::{KmeansError, Result};

pub const DEFAULT_ITERATION: usize = 300;
pub const DEFAULT_SEED: u64 = 1234;

/// What to do with a centroid slot that attracted no points in an Assign step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum EmptyClusterPolicy {
    /// Move the slot onto the point farthest from its nearest centroid
    #[default]
    Reseed,
    /// Leave the slot where it is for this round
    Keep,
    /// Abort the fit with `DegenerateAssignment`
    Fail,
}

/// What to do when every remaining seeding candidate has zero weight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SeedingFallback {
    /// Draw uniformly among the remaining candidates
    #[default]
    Uniform,
    /// Abort seeding with `DegenerateSeedingWeights`
    Fail,
}

// Validated run parameters. Built once, then handed to the model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KmeansParams {
    pub k: usize,
    pub max_iteration: usize,
    pub epsilon: f64,
    pub seed: u64,
    pub empty_cluster: EmptyClusterPolicy,
    pub seeding_fallback: SeedingFallback,
}

impl KmeansParams {
    /// Checks the bounds that do not depend on the data: `K > 1`,
    /// `1 < max_iteration < 1000`, `epsilon` finite and non-negative.
    /// The `K < N` half of the cluster bound is checked against the dataset in `fit`.
    pub fn new(k: usize, max_iteration: usize, epsilon: f64) -> Result<Self> {
        if !(1 < max_iteration && max_iteration < 1000) {
            return Err(KmeansError::InvalidIterationBound(max_iteration));
        }
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(KmeansError::InvalidThreshold(epsilon.to_string()));
        }
        if k <= 1 {
            return Err(KmeansError::InvalidClusterCount { requested: k, n_points: 0 });
        }
        Ok(Self {
            k,
            max_iteration,
            epsilon,
            seed: DEFAULT_SEED,
            empty_cluster: EmptyClusterPolicy::default(),
            seeding_fallback: SeedingFallback::default(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    pub fn with_seeding_fallback(mut self, fallback: SeedingFallback) -> Self {
        self.seeding_fallback = fallback;
        self
    }

    /// Full cluster-count check once the number of points is known
    pub fn check_cluster_count(&self, n_points: usize) -> Result<()> {
        if 1 < self.k && self.k < n_points {
            Ok(())
        } else {
            Err(KmeansError::InvalidClusterCount { requested: self.k, n_points })
        }
    }
}
