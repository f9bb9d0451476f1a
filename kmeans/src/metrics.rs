//! Metrics calculation for cluster quality assessment
//! Total within-cluster distance (the elbow curve's y axis), its squared
//! counterpart minimized by Lloyd's update, and the whole-dataset mean

use crate::{
    dataset::Dataset,
    types::{Assignment, EuclideanDistance, KmeansValue},
};

/// Sum of distances from every point to the centroid it is assigned to
///
/// Points missing from `assigned` are skipped.
pub fn inertia(data: &Dataset, centroids: &[Vec<f64>], assigned: &Assignment) -> f64 {
    data.iter()
        .filter_map(|(id, row)| assigned.get(&id).map(|slot| row.euclidean_distance(&centroids[*slot])))
        .sum()
}

/// Sum of squared distances from every point to its assigned centroid
pub fn sum_of_squares(data: &Dataset, centroids: &[Vec<f64>], assigned: &Assignment) -> f64 {
    data.iter()
        .filter_map(|(id, row)| assigned.get(&id).map(|slot| row.squared_distance(&centroids[*slot])))
        .sum()
}

/// Coordinate-wise mean of all points
pub fn mean(data: &Dataset) -> Vec<f64> {
    let mut sum = Vec::<f64>::zero(data.dim());
    data.iter().for_each(|(_, row)| sum.add_by_field(row));
    sum.div_by_n(data.len())
}
