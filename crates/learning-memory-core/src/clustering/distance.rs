//! Distance metrics used by density clustering and value validation.
//!
//! Distances are accumulated in `f64` so that sums over high-dimensional
//! `f32` embeddings do not lose precision near zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClusterError;

/// Distance metric for comparing embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance: 1 - cos(a, b). Range [0, 2]. Magnitude-invariant.
    #[default]
    Cosine,
    /// L2 Euclidean distance. Range [0, inf).
    Euclidean,
}

impl DistanceMetric {
    /// Distance between `a` and `b` under this metric.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        match self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
        }
    }

    /// Lowercase name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            other => Err(format!(
                "unknown metric '{}', expected 'cosine' or 'euclidean'",
                other
            )),
        }
    }
}

/// Raw cosine similarity in [-1, 1].
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ.
/// Callers comparing vectors of unchecked origin use [`checked_cosine_distance`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Cosine distance `1 - cos(a, b)` in [0, 2].
///
/// A zero vector is treated as orthogonal to everything (distance 1.0).
///
/// ```
/// use learning_memory_core::clustering::cosine_distance;
///
/// assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-12);
/// assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-12);
/// assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-12);
/// ```
#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Cosine distance that refuses vectors of different lengths.
///
/// `expected` is the reference vector (a centroid); the error names both
/// dimensions.
///
/// ```
/// use learning_memory_core::clustering::checked_cosine_distance;
///
/// assert!(checked_cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).unwrap().abs() < 1e-12);
/// assert!(checked_cosine_distance(&[1.0, 0.0, 0.0], &[1.0, 0.0]).is_err());
/// ```
pub fn checked_cosine_distance(actual: &[f32], expected: &[f32]) -> Result<f64, ClusterError> {
    if actual.len() != expected.len() {
        return Err(ClusterError::DimensionMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    Ok(cosine_distance(actual, expected))
}

/// Euclidean (L2) distance.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_is_magnitude_invariant() {
        let a = [0.3, 0.4, 0.5];
        let b = [3.0, 4.0, 5.0];
        assert!(cosine_distance(&a, &b).abs() < 1e-9);
    }

    #[test]
    fn test_zero_vector_distance_is_one() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 0.0]), 1.0);
    }

    #[test]
    fn test_checked_distance_rejects_unequal_lengths() {
        let err = checked_cosine_distance(&[0.5; 16], &[0.5; 8]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::DimensionMismatch {
                expected: 8,
                actual: 16
            }
        );

        // The unchecked form would report an orthogonal pair.
        assert_eq!(cosine_distance(&[0.5; 16], &[0.5; 8]), 1.0);
    }

    #[test]
    fn test_euclidean() {
        assert!((euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_metric_parse_and_serde() {
        assert_eq!("Cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert!("manhattan".parse::<DistanceMetric>().is_err());
        assert_eq!(
            serde_json::to_string(&DistanceMetric::Euclidean).unwrap(),
            "\"euclidean\""
        );
    }
}
