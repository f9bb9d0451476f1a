//! Failure conditions surfaced by the clustering core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KmeansError>;

/// Errors returned by dataset construction, parameter validation, seeding and refinement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KmeansError {
    /// `K` is not strictly between 1 and the number of points
    #[error("invalid number of clusters: {requested} (expected 1 < K < {n_points})")]
    InvalidClusterCount { requested: usize, n_points: usize },

    /// `max_iterations` is not strictly between 1 and 1000
    #[error("invalid maximum iteration: {0} (expected 1 < max_iterations < 1000)")]
    InvalidIterationBound(usize),

    /// `epsilon` is negative, not finite, or could not be read as a number
    #[error("invalid epsilon: {0}")]
    InvalidThreshold(String),

    /// A centroid slot attracted no points and the policy forbids recovery
    #[error("cluster slot {slot} received no points at iteration {iteration}")]
    DegenerateAssignment { slot: usize, iteration: usize },

    /// Every remaining seeding candidate coincides with a chosen centroid
    #[error("all seeding weights are zero after choosing {chosen} centroids")]
    DegenerateSeedingWeights { chosen: usize },

    /// Distances to the chosen centroids overflowed, so no weighted draw is possible
    #[error("seeding weights are not finite after choosing {chosen} centroids")]
    NonFiniteSeedingWeights { chosen: usize },

    #[error("dataset needs at least 2 points, got {0}")]
    NotEnoughPoints(usize),

    #[error("points must have at least one coordinate")]
    ZeroDimension,

    #[error("point {identifier} has {found} coordinates, expected {expected}")]
    DimensionMismatch { identifier: usize, expected: usize, found: usize },

    #[error("identifier {0} appears more than once")]
    DuplicateIdentifier(usize),

    #[error("point {identifier} has a non-finite coordinate")]
    NonFiniteCoordinate { identifier: usize },
}
