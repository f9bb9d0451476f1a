//! Type definitions and trait implementations for K-Means clustering
//! Includes the Euclidean distance, the field-wise arithmetic used for centroid
//! averaging, and the centroid/report types handed back to callers

use std::collections::BTreeMap;

use num_traits::{Float, NumCast};
use serde::Serialize;

/// Operations required for K-Means centroid calculations
pub trait KmeansValue {
    /// Create a zero value of the given dimensionality
    fn zero(dim: usize) -> Self;
    /// Element-wise in-place addition
    fn add_by_field(&mut self, right: &Self);
    /// Divide all elements by a scalar value (for averaging)
    fn div_by_n(&self, div: usize) -> Self;
}

/// Implementation of KmeansValue for dense coordinate vectors
impl<D> KmeansValue for Vec<D>
where
    D: Float
{
    fn zero(dim: usize) -> Self {
        vec![D::zero(); dim]
    }
    fn add_by_field(&mut self, right: &Self) {
        self.iter_mut().zip(right.iter()).for_each(|(a, b)| *a = *a + *b);
    }
    fn div_by_n(&self, div: usize) -> Self {
        let div = <D as NumCast>::from(div).unwrap_or_else(D::nan);
        self.iter().map(|a| *a / div).collect()
    }
}

/// Trait for calculating Euclidean distance between two coordinate vectors
pub trait EuclideanDistance {
    /// Calculate sqrt(sum((a[i] - b[i])^2)) over all paired elements
    fn euclidean_distance(&self, right: &Self) -> f64;

    /// Same sum without the square root
    fn squared_distance(&self, right: &Self) -> f64;
}

impl<D> EuclideanDistance for [D]
where
    D: Float + Into<f64>
{
    fn euclidean_distance(&self, right: &Self) -> f64 {
        self.squared_distance(right).sqrt()
    }

    fn squared_distance(&self, right: &Self) -> f64 {
        self.iter().zip(right.iter())
            .map(|(&a, &b)| {
                let diff: f64 = (a - b).into();
                diff * diff
            })
            .sum::<f64>()
    }
}

/// One centroid slot of the clustering state
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Centroid {
    /// Identifier of the point this slot was seeded from. Only meaningful
    /// before the first update moves the slot off that point.
    pub seed_id: Option<usize>,
    pub coords: Vec<f64>,
}

impl Centroid {
    pub fn new(seed_id: Option<usize>, coords: Vec<f64>) -> Self {
        Self { seed_id, coords }
    }
}

/// Point identifier -> centroid slot
pub type Assignment = BTreeMap<usize, usize>;

/// Everything a finished fit reports back
#[derive(Clone, Debug, Serialize)]
pub struct FitReport {
    /// Identifiers of the seeding points, in the order they were chosen
    pub seeds: Vec<usize>,
    /// Final coordinates, one vector per slot
    pub centroids: Vec<Vec<f64>>,
    /// Refinement rounds actually executed
    pub iterations: usize,
    pub converged: bool,
    /// Final nearest-centroid assignment
    pub assigned: Assignment,
    /// Sum of squared distances measured at every Assign step
    pub sse_history: Vec<f64>,
    /// Total within-cluster (unsquared) distance for the final centroids
    pub inertia: f64,
}
