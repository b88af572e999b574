//! Distance statistics for value validation.

use crate::clustering::checked_cosine_distance;
use crate::error::ClusterError;

use super::types::ValidationMetrics;

/// Arithmetic mean. Zero for an empty slice.
pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divides by `n`). Zero for an empty slice.
pub(crate) fn population_std(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}

/// Compare a candidate against member spread around `centroid`.
///
/// `members` must be non-empty; callers handle the empty cluster first.
///
/// # Errors
/// - `ClusterError::DimensionMismatch` if the candidate or any member differs
///   in length from `centroid`
pub(crate) fn distance_metrics<'a>(
    candidate: &[f32],
    centroid: &[f32],
    members: impl IntoIterator<Item = &'a [f32]>,
    std_multiplier: f64,
) -> Result<ValidationMetrics, ClusterError> {
    let candidate_distance = checked_cosine_distance(candidate, centroid)?;
    let member_distances = members
        .into_iter()
        .map(|m| checked_cosine_distance(m, centroid))
        .collect::<Result<Vec<f64>, _>>()?;

    let mean_distance = mean(&member_distances);
    let std_distance = population_std(&member_distances);

    Ok(ValidationMetrics {
        candidate_distance,
        mean_distance,
        std_distance,
        threshold: mean_distance + std_multiplier * std_distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_population_std() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&xs) - 5.0).abs() < 1e-12);
        assert!((population_std(&xs) - 2.0).abs() < 1e-12);

        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
        assert_eq!(population_std(&[0.3]), 0.0);
    }

    #[test]
    fn test_distance_metrics_threshold() {
        let centroid = [1.0f32, 0.0];
        let on_axis = [1.0f32, 0.0];
        let orthogonal = [0.0f32, 1.0];

        let metrics = distance_metrics(
            &on_axis,
            &centroid,
            [&on_axis[..], &orthogonal[..]],
            0.5,
        )
        .unwrap();

        // Member distances are 0 and 1.
        assert!((metrics.mean_distance - 0.5).abs() < 1e-9);
        assert!((metrics.std_distance - 0.5).abs() < 1e-9);
        assert!((metrics.threshold - 0.75).abs() < 1e-9);
        assert!(metrics.candidate_distance.abs() < 1e-9);
        assert!(metrics.accepts());
    }

    #[test]
    fn test_distance_metrics_reject_dimension_mismatch() {
        let centroid = [1.0f32, 0.0];
        let member = [1.0f32, 0.0];

        let err = distance_metrics(&[1.0, 0.0, 0.0], &centroid, [&member[..]], 0.5).unwrap_err();
        assert_eq!(
            err,
            ClusterError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );

        let short_member = [1.0f32];
        let err = distance_metrics(&member, &centroid, [&short_member[..]], 0.5).unwrap_err();
        assert!(matches!(err, ClusterError::DimensionMismatch { actual: 1, .. }));
    }
}
