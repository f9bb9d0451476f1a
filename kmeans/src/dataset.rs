//! In-memory point set the clustering runs over

use std::collections::BTreeMap;

use crate::error::{KmeansError, Result};

/// Points keyed by their source identifier.
///
/// Backed by a [`BTreeMap`] so iteration is always in ascending identifier
/// order; every pass over the data (seeding, assignment, update) relies on
/// that order for reproducible results.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    points: BTreeMap<usize, Vec<f64>>,
    dim: usize,
}

impl Dataset {
    /// Build a dataset from `(identifier, coordinates)` pairs in any order.
    ///
    /// # Errors
    /// * `NotEnoughPoints` when fewer than two points are given
    /// * `ZeroDimension` when points carry no coordinates
    /// * `DimensionMismatch` when a row differs in length from the first one
    /// * `DuplicateIdentifier` when two rows share an identifier
    /// * `NonFiniteCoordinate` on NaN or infinite values
    pub fn new(rows: Vec<(usize, Vec<f64>)>) -> Result<Self> {
        if rows.len() < 2 {
            return Err(KmeansError::NotEnoughPoints(rows.len()));
        }
        let dim = rows[0].1.len();
        if dim == 0 {
            return Err(KmeansError::ZeroDimension);
        }

        let mut points = BTreeMap::new();
        for (identifier, coords) in rows {
            if coords.len() != dim {
                return Err(KmeansError::DimensionMismatch { identifier, expected: dim, found: coords.len() });
            }
            if coords.iter().any(|c| !c.is_finite()) {
                return Err(KmeansError::NonFiniteCoordinate { identifier });
            }
            if points.insert(identifier, coords).is_some() {
                return Err(KmeansError::DuplicateIdentifier(identifier));
            }
        }

        Ok(Self { points, dim })
    }

    /// Convenience constructor numbering rows `0..N`
    pub fn from_vec(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows.into_iter().enumerate().collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of coordinates per point
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, identifier: usize) -> Option<&Vec<f64>> {
        self.points.get(&identifier)
    }

    /// Identifiers in ascending order
    pub fn ids(&self) -> Vec<usize> {
        self.points.keys().copied().collect()
    }

    /// `(identifier, coordinates)` in ascending identifier order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Vec<f64>)> {
        self.points.iter().map(|(id, coords)| (*id, coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_sorted_by_identifier() {
        let dataset = Dataset::new(vec![
            (40, vec![4.0]),
            (3, vec![3.0]),
            (17, vec![1.0]),
        ]).unwrap();
        assert_eq!(dataset.ids(), vec![3, 17, 40]);
        assert_eq!(dataset.dim(), 1);
        assert_eq!(dataset.get(17), Some(&vec![1.0]));
    }

    #[test]
    fn rejects_broken_input() {
        assert_eq!(Dataset::new(vec![(1, vec![0.0])]), Err(KmeansError::NotEnoughPoints(1)));
        assert_eq!(Dataset::new(vec![(1, vec![]), (2, vec![])]), Err(KmeansError::ZeroDimension));
        assert_eq!(
            Dataset::new(vec![(1, vec![0.0, 1.0]), (2, vec![0.0])]),
            Err(KmeansError::DimensionMismatch { identifier: 2, expected: 2, found: 1 })
        );
        assert_eq!(
            Dataset::new(vec![(5, vec![0.0]), (5, vec![1.0])]),
            Err(KmeansError::DuplicateIdentifier(5))
        );
        assert_eq!(
            Dataset::new(vec![(1, vec![0.0]), (2, vec![f64::NAN])]),
            Err(KmeansError::NonFiniteCoordinate { identifier: 2 })
        );
    }
}
