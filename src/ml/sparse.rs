//! Sparse feature vectors.
//!
//! Only non-zero weights are stored, keyed by feature index. Features outside
//! the fitted vocabulary simply never get an entry, so "ignore unseen terms"
//! needs no special casing anywhere downstream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};

/// A sparse vector of a fixed dimensionality.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    entries: BTreeMap<usize, f64>,
}

impl SparseVector {
    /// Create the zero vector of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            entries: BTreeMap::new(),
        }
    }

    /// Build a vector from `(index, value)` pairs.
    ///
    /// Zero values are dropped; duplicate indices are summed. Indices must be
    /// below `dim` and values must be finite.
    pub fn from_pairs<I>(dim: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut vector = Self::zeros(dim);
        for (index, value) in pairs {
            if index >= dim {
                return Err(SentimentError::shape(format!(
                    "feature index {index} out of range for dimension {dim}"
                )));
            }
            if !value.is_finite() {
                return Err(SentimentError::NonFiniteFeature { index, value });
            }
            *vector.entries.entry(index).or_insert(0.0) += value;
        }
        vector.entries.retain(|_, v| *v != 0.0);
        Ok(vector)
    }

    /// Build a sparse vector from a dense slice.
    pub fn from_dense(values: &[f64]) -> Result<Self> {
        Self::from_pairs(values.len(), values.iter().copied().enumerate())
    }

    /// Dimensionality of the vector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value at `index` (zero if absent).
    pub fn get(&self, index: usize) -> f64 {
        self.entries.get(&index).copied().unwrap_or(0.0)
    }

    /// Iterate over stored entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(&i, &v)| (i, v))
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f64 {
        self.entries.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit Euclidean length. The zero vector is left unchanged.
    pub fn normalize_l2(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for value in self.entries.values_mut() {
                *value /= norm;
            }
        }
    }

    /// Dot product with a dense row of the same dimensionality.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(&i, &v)| v * dense.get(i).copied().unwrap_or(0.0))
            .sum()
    }

    /// Check that every stored value is finite.
    pub fn check_finite(&self) -> Result<()> {
        match self.entries.iter().find(|(_, v)| !v.is_finite()) {
            Some((&index, &value)) => Err(SentimentError::NonFiniteFeature { index, value }),
            None => Ok(()),
        }
    }

    /// Dense copy of the vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (&i, &v) in &self.entries {
            dense[i] = v;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let v = SparseVector::from_pairs(5, vec![(3, 2.0), (1, 0.0), (3, 1.0), (0, 4.0)]).unwrap();
        assert_eq!(v.dim(), 5);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(3), 3.0);
        assert_eq!(v.get(1), 0.0);
        assert_eq!(v.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_from_pairs_rejects_bad_input() {
        let err = SparseVector::from_pairs(2, vec![(2, 1.0)]).unwrap_err();
        assert!(err.is_state_error());

        let err = SparseVector::from_pairs(2, vec![(0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, SentimentError::NonFiniteFeature { index: 0, .. }));
    }

    #[test]
    fn test_normalize_l2() {
        let mut v = SparseVector::from_dense(&[3.0, 0.0, 4.0]).unwrap();
        v.normalize_l2();
        assert!((v.l2_norm() - 1.0).abs() < 1e-12);
        assert!((v.get(0) - 0.6).abs() < 1e-12);

        let mut zero = SparseVector::zeros(3);
        zero.normalize_l2();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_dot_dense() {
        let v = SparseVector::from_dense(&[1.0, 0.0, 2.0]).unwrap();
        assert_eq!(v.dot_dense(&[0.5, 10.0, 0.25]), 1.0);
        assert_eq!(v.to_dense(), vec![1.0, 0.0, 2.0]);
    }
}
