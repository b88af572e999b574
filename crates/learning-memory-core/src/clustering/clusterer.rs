//! Stateless clustering facade: input validation, HDBSCAN labeling and
//! weighted centroid computation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::hdbscan::{HDBSCANParams, HdbscanClusterer, NOISE_LABEL};
use crate::error::ClusterError;

/// Per-call clustering output. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// One label per input point; [`NOISE_LABEL`] for noise.
    pub labels: Vec<i32>,
    /// Membership probability per point in [0, 1].
    pub probabilities: Vec<f32>,
    /// Number of non-noise clusters.
    pub n_clusters: usize,
    /// Number of points labeled noise.
    pub noise_count: usize,
}

/// One non-noise cluster with its weighted centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Non-negative cluster label.
    pub label: i32,
    /// Weighted mean of member embeddings.
    pub centroid: Vec<f32>,
    /// Member identifiers in input order.
    pub member_ids: Vec<String>,
    /// Number of members. Always equals `member_ids.len()`.
    pub size: usize,
    /// Mean member weight.
    pub avg_weight: f32,
}

/// Density clustering plus weighted centroids.
///
/// Holds only parameters. Each [`Clusterer::cluster`] call builds a fresh
/// [`HdbscanClusterer`], so the value is freely shared across tasks.
///
/// # Example
///
/// ```
/// use learning_memory_core::clustering::{Clusterer, HDBSCANParams};
///
/// let clusterer = Clusterer::new(HDBSCANParams::default()).unwrap();
/// let err = clusterer.cluster(&[], None).unwrap_err();
/// assert!(err.to_string().contains("empty"));
/// ```
#[derive(Debug, Clone)]
pub struct Clusterer {
    params: HDBSCANParams,
}

impl Default for Clusterer {
    fn default() -> Self {
        Self {
            params: HDBSCANParams::default(),
        }
    }
}

impl Clusterer {
    /// Create a clusterer after validating `params`.
    pub fn new(params: HDBSCANParams) -> Result<Self, ClusterError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Clustering parameters.
    #[inline]
    pub fn params(&self) -> &HDBSCANParams {
        &self.params
    }

    /// Partition `embeddings` into density clusters plus noise.
    ///
    /// `weights` is length-checked but never influences membership; weights
    /// only matter to [`Clusterer::compute_centroids`].
    ///
    /// # Errors
    ///
    /// - `ClusterError::EmptyInput` if `embeddings` is empty
    /// - `ClusterError::NotTwoDimensional` for ragged or zero-width rows
    /// - `ClusterError::NonFiniteEmbedding` for NaN or infinite components
    /// - `ClusterError::WeightsLengthMismatch` if `weights` has the wrong length
    pub fn cluster(
        &self,
        embeddings: &[Vec<f32>],
        weights: Option<&[f32]>,
    ) -> Result<ClusterResult, ClusterError> {
        validate_embeddings(embeddings)?;

        if let Some(w) = weights {
            if w.len() != embeddings.len() {
                return Err(ClusterError::weights_mismatch(w.len(), embeddings.len()));
            }
        }

        let fitted = HdbscanClusterer::new(self.params.clone()).fit(embeddings)?;
        let noise_count = fitted.labels.iter().filter(|&&l| l == NOISE_LABEL).count();

        tracing::debug!(
            n_points = embeddings.len(),
            dimension = embeddings[0].len(),
            n_clusters = fitted.n_clusters,
            noise_count,
            "Clustering complete"
        );

        Ok(ClusterResult {
            labels: fitted.labels,
            probabilities: fitted.probabilities,
            n_clusters: fitted.n_clusters,
            noise_count,
        })
    }

    /// Weighted centroid per non-noise label, sorted by ascending label.
    ///
    /// `centroid = Σ(w_i · e_i) / Σ(w_i)`; weights default to 1.0.
    ///
    /// # Errors
    ///
    /// - `ClusterError::LengthMismatch` if embeddings, labels and ids differ in length
    /// - `ClusterError::WeightsLengthMismatch` if `weights` has the wrong length
    /// - `ClusterError::InvalidWeight` for weights outside (0, 1] or non-finite
    /// - `ClusterError::ZeroTotalWeight` if a cluster's weights sum to zero
    /// - shape errors as in [`Clusterer::cluster`]
    pub fn compute_centroids(
        &self,
        embeddings: &[Vec<f32>],
        labels: &[i32],
        ids: &[String],
        weights: Option<&[f32]>,
    ) -> Result<Vec<ClusterInfo>, ClusterError> {
        if embeddings.len() != labels.len() || embeddings.len() != ids.len() {
            return Err(ClusterError::LengthMismatch {
                embeddings: embeddings.len(),
                labels: labels.len(),
                ids: ids.len(),
            });
        }

        if let Some(w) = weights {
            if w.len() != embeddings.len() {
                return Err(ClusterError::weights_mismatch(w.len(), embeddings.len()));
            }
            if let Some((index, &value)) = w
                .iter()
                .enumerate()
                .find(|(_, &v)| !is_member_weight(v))
            {
                return Err(ClusterError::InvalidWeight { index, value });
            }
        }

        if embeddings.is_empty() {
            return Ok(Vec::new());
        }
        validate_embeddings(embeddings)?;

        let dim = embeddings[0].len();
        let weight_at = |i: usize| weights.map_or(1.0f32, |w| w[i]);

        let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (i, &label) in labels.iter().enumerate() {
            if label < 0 {
                continue;
            }
            groups.entry(label).or_default().push(i);
        }

        let mut clusters = Vec::with_capacity(groups.len());
        for (label, members) in groups {
            let total_weight: f64 = members.iter().map(|&i| f64::from(weight_at(i))).sum();
            if total_weight <= 0.0 {
                return Err(ClusterError::ZeroTotalWeight { label });
            }

            let mut sum = vec![0.0f64; dim];
            for &i in &members {
                let w = f64::from(weight_at(i));
                for (acc, &x) in sum.iter_mut().zip(embeddings[i].iter()) {
                    *acc += w * f64::from(x);
                }
            }

            let centroid: Vec<f32> = sum.iter().map(|s| (s / total_weight) as f32).collect();
            let size = members.len();

            clusters.push(ClusterInfo {
                label,
                centroid,
                member_ids: members.iter().map(|&i| ids[i].clone()).collect(),
                size,
                avg_weight: (total_weight / size as f64) as f32,
            });
        }

        Ok(clusters)
    }
}

/// Member weights come from confidence tiers and lie in (0, 1].
#[inline]
fn is_member_weight(w: f32) -> bool {
    w.is_finite() && w > 0.0 && w <= 1.0
}

/// Reject empty, ragged, zero-width or non-finite batches.
fn validate_embeddings(embeddings: &[Vec<f32>]) -> Result<(), ClusterError> {
    let first = embeddings.first().ok_or(ClusterError::EmptyInput)?;
    let dim = first.len();
    if dim == 0 {
        return Err(ClusterError::not_two_dimensional(
            "rows have zero dimensions",
        ));
    }

    for (row, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != dim {
            return Err(ClusterError::not_two_dimensional(format!(
                "row {} has {} dimensions, expected {}",
                row,
                embedding.len(),
                dim
            )));
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(ClusterError::NonFiniteEmbedding { row });
        }
    }

    Ok(())
}
