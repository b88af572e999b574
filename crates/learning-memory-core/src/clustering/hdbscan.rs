//! HDBSCAN parameters and the density clustering algorithm.
//!
//! # Algorithm
//!
//! HDBSCAN = Hierarchical Density-Based Spatial Clustering of Applications with Noise
//!
//! Steps:
//! 1. Compute core distances (distance to the `min_samples`-th nearest point,
//!    counting the point itself)
//! 2. Mutual reachability: MR(a,b) = max(core_dist(a), core_dist(b), dist(a,b))
//! 3. Minimum spanning tree over MR with Prim's algorithm (dense, O(n) memory)
//! 4. Single-linkage hierarchy from the sorted MST edges via Union-Find
//! 5. Condense the hierarchy with `min_cluster_size`
//! 6. Select clusters by excess of mass (or leaves) and label points
//!
//! The clusterer is stateless between calls: every [`HdbscanClusterer::fit`]
//! builds its own scratch structures, so unrelated batches never share
//! density estimates.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::distance::DistanceMetric;
use crate::config::{DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_MIN_SAMPLES};
use crate::error::ClusterError;

/// Label assigned to points that belong to no cluster.
pub const NOISE_LABEL: i32 = -1;

/// Smallest distance used when converting to lambda = 1 / distance.
///
/// Duplicate points have zero mutual reachability; capping keeps lambda and
/// stability finite.
const MIN_LAMBDA_DISTANCE: f64 = 1e-12;

/// Cluster selection method for HDBSCAN.
///
/// Determines how clusters are extracted from the condensed hierarchy.
///
/// # Example
///
/// ```
/// use learning_memory_core::clustering::ClusterSelectionMethod;
///
/// let method = ClusterSelectionMethod::default();
/// assert_eq!(method, ClusterSelectionMethod::EOM);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterSelectionMethod {
    /// Excess of Mass - default, stable on sparse data.
    /// Selects clusters based on persistence in the hierarchy.
    #[default]
    EOM,
    /// Leaf clusters only - more granular clustering.
    /// Selects only the leaf nodes of the condensed tree.
    Leaf,
}

impl ClusterSelectionMethod {
    /// Get description of this method.
    pub fn description(&self) -> &'static str {
        match self {
            ClusterSelectionMethod::EOM => "Excess of Mass - stable general purpose clustering",
            ClusterSelectionMethod::Leaf => "Leaf clusters only - more granular clustering",
        }
    }

    /// Lowercase name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterSelectionMethod::EOM => "eom",
            ClusterSelectionMethod::Leaf => "leaf",
        }
    }
}

impl std::fmt::Display for ClusterSelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClusterSelectionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eom" => Ok(ClusterSelectionMethod::EOM),
            "leaf" => Ok(ClusterSelectionMethod::Leaf),
            other => Err(format!(
                "unknown cluster selection method '{}', expected 'eom' or 'leaf'",
                other
            )),
        }
    }
}

/// Parameters for the HDBSCAN clustering algorithm.
///
/// # Example
///
/// ```
/// use learning_memory_core::clustering::HDBSCANParams;
///
/// let params = HDBSCANParams::default().with_min_cluster_size(3);
/// assert_eq!(params.min_samples, 3);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HDBSCANParams {
    /// Minimum number of points to form a cluster.
    pub min_cluster_size: usize,

    /// Neighborhood size (including the point itself) for core distances.
    /// Must be <= min_cluster_size.
    pub min_samples: usize,

    /// Method for selecting clusters from the hierarchy.
    pub cluster_selection_method: ClusterSelectionMethod,

    /// Distance metric to use.
    pub metric: DistanceMetric,
}

impl Default for HDBSCANParams {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: DEFAULT_MIN_SAMPLES,
            cluster_selection_method: ClusterSelectionMethod::EOM,
            metric: DistanceMetric::Cosine,
        }
    }
}

impl HDBSCANParams {
    /// Set minimum cluster size.
    ///
    /// Value is NOT automatically clamped - use validate() to check.
    #[must_use]
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Set minimum samples.
    ///
    /// Value is NOT automatically clamped - use validate() to check.
    #[must_use]
    pub fn with_min_samples(mut self, samples: usize) -> Self {
        self.min_samples = samples;
        self
    }

    /// Set cluster selection method.
    #[must_use]
    pub fn with_selection_method(mut self, method: ClusterSelectionMethod) -> Self {
        self.cluster_selection_method = method;
        self
    }

    /// Set distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if:
    /// - min_cluster_size < 2
    /// - min_samples < 1
    /// - min_samples > min_cluster_size
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.min_cluster_size < 2 {
            return Err(ClusterError::invalid_parameter(format!(
                "min_cluster_size must be >= 2, got {}. A cluster needs at least 2 points.",
                self.min_cluster_size
            )));
        }

        if self.min_samples < 1 {
            return Err(ClusterError::invalid_parameter(format!(
                "min_samples must be >= 1, got {}",
                self.min_samples
            )));
        }

        if self.min_samples > self.min_cluster_size {
            return Err(ClusterError::invalid_parameter(format!(
                "min_samples ({}) must be <= min_cluster_size ({})",
                self.min_samples, self.min_cluster_size
            )));
        }

        Ok(())
    }

    /// Check if these params can produce any cluster for a given data size.
    #[inline]
    pub fn is_viable_for_size(&self, n_points: usize) -> bool {
        n_points >= self.min_cluster_size
    }
}

/// Raw per-point output of one HDBSCAN fit.
#[derive(Debug, Clone, PartialEq)]
pub struct HdbscanLabels {
    /// One label per input point; [`NOISE_LABEL`] for noise.
    pub labels: Vec<i32>,
    /// Membership strength per point in [0, 1]; 0.0 for noise.
    pub probabilities: Vec<f32>,
    /// Number of distinct non-noise labels.
    pub n_clusters: usize,
}

impl HdbscanLabels {
    fn all_noise(n: usize) -> Self {
        Self {
            labels: vec![NOISE_LABEL; n],
            probabilities: vec![0.0; n],
            n_clusters: 0,
        }
    }
}

/// One merge of the single-linkage hierarchy.
#[derive(Debug, Clone, Copy)]
struct MergeStep {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

/// Condensed cluster tree. Cluster 0 is the root.
#[derive(Debug, Default)]
struct CondensedTree {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    birth_lambda: Vec<f64>,
    size: Vec<usize>,
    /// Per input point: (cluster it fell out of, lambda at which it left).
    point_exit: Vec<(usize, f64)>,
}

impl CondensedTree {
    fn add_cluster(&mut self, parent: Option<usize>, birth_lambda: f64, size: usize) -> usize {
        let id = self.parent.len();
        self.parent.push(parent);
        self.children.push(Vec::new());
        self.birth_lambda.push(birth_lambda);
        self.size.push(size);
        if let Some(p) = parent {
            self.children[p].push(id);
        }
        id
    }

    fn n_clusters(&self) -> usize {
        self.parent.len()
    }

    /// Stability of every cluster: Σ over members of (λ_exit - λ_birth).
    fn stabilities(&self) -> Vec<f64> {
        let mut stability = vec![0.0f64; self.n_clusters()];

        for &(cluster, lambda) in &self.point_exit {
            stability[cluster] += lambda - self.birth_lambda[cluster];
        }

        for child in 1..self.n_clusters() {
            if let Some(p) = self.parent[child] {
                stability[p] +=
                    (self.birth_lambda[child] - self.birth_lambda[p]) * self.size[child] as f64;
            }
        }

        stability
    }

    fn descendants(&self, cluster: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children[cluster].clone();
        while let Some(c) = stack.pop() {
            out.push(c);
            stack.extend(self.children[c].iter().copied());
        }
        out
    }
}

/// HDBSCAN clusterer for batch density-based clustering.
///
/// # Example
///
/// ```
/// use learning_memory_core::clustering::{HdbscanClusterer, HDBSCANParams, NOISE_LABEL};
///
/// let params = HDBSCANParams::default()
///     .with_min_cluster_size(2)
///     .with_min_samples(1);
/// let clusterer = HdbscanClusterer::new(params);
/// let embeddings = vec![
///     vec![1.0, 0.0, 0.0],
///     vec![0.99, 0.01, 0.0],
///     vec![0.0, 1.0, 0.0],
///     vec![0.01, 0.99, 0.0],
/// ];
///
/// let out = clusterer.fit(&embeddings).unwrap();
/// assert_eq!(out.labels.len(), 4);
/// assert!(out.labels.iter().all(|&l| l >= NOISE_LABEL));
/// ```
#[derive(Debug, Clone)]
pub struct HdbscanClusterer {
    params: HDBSCANParams,
}

impl HdbscanClusterer {
    /// Create a new HDBSCAN clusterer with specified parameters.
    pub fn new(params: HDBSCANParams) -> Self {
        Self { params }
    }

    /// Create a clusterer with default parameters.
    pub fn with_defaults() -> Self {
        Self::new(HDBSCANParams::default())
    }

    /// Get the parameters.
    #[inline]
    pub fn params(&self) -> &HDBSCANParams {
        &self.params
    }

    /// Fit the clusterer to embeddings and return labels and probabilities.
    ///
    /// Embeddings must be non-empty rows of equal width; callers validate
    /// shape. Fewer points than `min_cluster_size` yields all noise.
    ///
    /// # Errors
    ///
    /// `ClusterError::InvalidParameter` if the parameters are invalid.
    pub fn fit(&self, embeddings: &[Vec<f32>]) -> Result<HdbscanLabels, ClusterError> {
        self.params.validate()?;

        let n = embeddings.len();
        if !self.params.is_viable_for_size(n) {
            tracing::debug!(
                n_points = n,
                min_cluster_size = self.params.min_cluster_size,
                "Fewer points than min_cluster_size; labeling all points as noise"
            );
            return Ok(HdbscanLabels::all_noise(n));
        }

        let core_distances = self.compute_core_distances(embeddings);
        let mst = self.build_mst(embeddings, &core_distances);
        let hierarchy = single_linkage(&mst, n);
        let tree = condense_tree(&hierarchy, n, self.params.min_cluster_size);
        let selected = self.select_clusters(&tree);
        let result = label_points(&tree, &selected, n);

        tracing::debug!(
            n_points = n,
            condensed_clusters = tree.n_clusters(),
            selected = result.n_clusters,
            noise = result.labels.iter().filter(|&&l| l == NOISE_LABEL).count(),
            method = self.params.cluster_selection_method.as_str(),
            metric = %self.params.metric,
            "HDBSCAN fit complete"
        );

        Ok(result)
    }

    /// Core distance per point: distance to its (min_samples - 1)-th nearest
    /// other point. `min_samples == 1` gives 0.0.
    fn compute_core_distances(&self, embeddings: &[Vec<f32>]) -> Vec<f64> {
        let n = embeddings.len();
        let k = (self.params.min_samples - 1).min(n - 1);
        if k == 0 {
            return vec![0.0; n];
        }

        let metric = self.params.metric;
        (0..n)
            .into_par_iter()
            .map(|i| {
                let mut distances: Vec<f64> = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| metric.distance(&embeddings[i], &embeddings[j]))
                    .collect();
                let (_, kth, _) = distances.select_nth_unstable_by(k - 1, f64::total_cmp);
                *kth
            })
            .collect()
    }

    /// Build the minimum spanning tree over mutual reachability with Prim's
    /// algorithm, computing distances on the fly.
    ///
    /// Returns n - 1 edges sorted ascending by weight: (node_a, node_b, weight)
    fn build_mst(&self, embeddings: &[Vec<f32>], core: &[f64]) -> Vec<(usize, usize, f64)> {
        let n = embeddings.len();
        let metric = self.params.metric;

        let mut in_tree = vec![false; n];
        let mut min_dist = vec![f64::INFINITY; n];
        let mut min_edge = vec![0usize; n];
        let mut edges = Vec::with_capacity(n.saturating_sub(1));

        let mut current = 0usize;
        in_tree[current] = true;

        for _ in 1..n {
            for j in 0..n {
                if in_tree[j] {
                    continue;
                }
                let mr = metric
                    .distance(&embeddings[current], &embeddings[j])
                    .max(core[current])
                    .max(core[j]);
                if mr < min_dist[j] {
                    min_dist[j] = mr;
                    min_edge[j] = current;
                }
            }

            let mut next: Option<usize> = None;
            for j in 0..n {
                if in_tree[j] {
                    continue;
                }
                match next {
                    Some(best) if min_dist[best] <= min_dist[j] => {}
                    _ => next = Some(j),
                }
            }

            let Some(next) = next else { break };
            in_tree[next] = true;
            edges.push((min_edge[next], next, min_dist[next]));
            current = next;
        }

        edges.sort_by(|a, b| a.2.total_cmp(&b.2));
        edges
    }

    /// Pick the clusters that become output labels.
    ///
    /// The root is never selected, so a batch without any split is all noise.
    fn select_clusters(&self, tree: &CondensedTree) -> Vec<usize> {
        let n_clusters = tree.n_clusters();
        if n_clusters <= 1 {
            return Vec::new();
        }

        match self.params.cluster_selection_method {
            ClusterSelectionMethod::Leaf => (1..n_clusters)
                .filter(|&c| tree.children[c].is_empty())
                .collect(),
            ClusterSelectionMethod::EOM => {
                let mut stability = tree.stabilities();
                let mut is_selected = vec![true; n_clusters];
                is_selected[0] = false;

                // Children always carry larger ids than their parent.
                for cluster in (1..n_clusters).rev() {
                    let subtree: f64 = tree.children[cluster]
                        .iter()
                        .map(|&c| stability[c])
                        .sum();

                    if subtree > stability[cluster] {
                        is_selected[cluster] = false;
                        stability[cluster] = subtree;
                    } else {
                        for d in tree.descendants(cluster) {
                            is_selected[d] = false;
                        }
                    }
                }

                (1..n_clusters).filter(|&c| is_selected[c]).collect()
            }
        }
    }
}

/// Build the single-linkage hierarchy from sorted MST edges.
///
/// Node ids 0..n are points; node n + k is the k-th merge.
fn single_linkage(mst: &[(usize, usize, f64)], n: usize) -> Vec<MergeStep> {
    let total = 2 * n - 1;
    let mut parent: Vec<usize> = (0..total).collect();
    let mut size: Vec<usize> = vec![1; total];

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        while parent[i] != root {
            let next = parent[i];
            parent[i] = root;
            i = next;
        }
        root
    }

    let mut steps = Vec::with_capacity(mst.len());
    for (k, &(a, b, distance)) in mst.iter().enumerate() {
        let node = n + k;
        let ra = find(&mut parent, a);
        let rb = find(&mut parent, b);
        size[node] = size[ra] + size[rb];
        parent[ra] = node;
        parent[rb] = node;
        steps.push(MergeStep {
            left: ra,
            right: rb,
            distance,
            size: size[node],
        });
    }

    steps
}

/// Collapse the hierarchy so that only splits into two sides of at least
/// `min_cluster_size` points create new clusters.
fn condense_tree(hierarchy: &[MergeStep], n: usize, min_cluster_size: usize) -> CondensedTree {
    let mut tree = CondensedTree {
        point_exit: vec![(0, 0.0); n],
        ..Default::default()
    };

    let node_size = |node: usize| -> usize {
        if node < n {
            1
        } else {
            hierarchy[node - n].size
        }
    };

    let root_node = n + hierarchy.len() - 1;
    let root = tree.add_cluster(None, 0.0, n);

    // (hierarchy node, condensed cluster it currently belongs to)
    let mut stack: Vec<(usize, usize)> = vec![(root_node, root)];

    while let Some((node, cluster)) = stack.pop() {
        if node < n {
            // Unreachable while min_cluster_size >= 2.
            continue;
        }

        let step = hierarchy[node - n];
        let lambda = 1.0 / step.distance.max(MIN_LAMBDA_DISTANCE);
        let left_big = node_size(step.left) >= min_cluster_size;
        let right_big = node_size(step.right) >= min_cluster_size;

        match (left_big, right_big) {
            (true, true) => {
                for side in [step.left, step.right] {
                    let child = tree.add_cluster(Some(cluster), lambda, node_size(side));
                    stack.push((side, child));
                }
            }
            (false, false) => {
                for side in [step.left, step.right] {
                    fall_out(hierarchy, n, side, cluster, lambda, &mut tree.point_exit);
                }
            }
            (true, false) => {
                fall_out(hierarchy, n, step.right, cluster, lambda, &mut tree.point_exit);
                stack.push((step.left, cluster));
            }
            (false, true) => {
                fall_out(hierarchy, n, step.left, cluster, lambda, &mut tree.point_exit);
                stack.push((step.right, cluster));
            }
        }
    }

    tree
}

/// Record every point under `node` as leaving `cluster` at `lambda`.
fn fall_out(
    hierarchy: &[MergeStep],
    n: usize,
    node: usize,
    cluster: usize,
    lambda: f64,
    point_exit: &mut [(usize, f64)],
) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current < n {
            point_exit[current] = (cluster, lambda);
        } else {
            let step = hierarchy[current - n];
            stack.push(step.left);
            stack.push(step.right);
        }
    }
}

/// Assign labels (numbered by ascending selected cluster id) and membership
/// probabilities.
fn label_points(tree: &CondensedTree, selected: &[usize], n: usize) -> HdbscanLabels {
    if selected.is_empty() {
        return HdbscanLabels::all_noise(n);
    }

    let mut label_of = vec![NOISE_LABEL; tree.n_clusters()];
    let mut sorted = selected.to_vec();
    sorted.sort_unstable();
    for (label, &cluster) in sorted.iter().enumerate() {
        label_of[cluster] = label as i32;
    }

    let mut labels = vec![NOISE_LABEL; n];
    for (point, &(exit_cluster, _)) in tree.point_exit.iter().enumerate() {
        let mut current = Some(exit_cluster);
        while let Some(c) = current {
            if label_of[c] != NOISE_LABEL {
                labels[point] = label_of[c];
                break;
            }
            current = tree.parent[c];
        }
    }

    let mut max_lambda = vec![0.0f64; sorted.len()];
    for (point, &label) in labels.iter().enumerate() {
        if label != NOISE_LABEL {
            let slot = &mut max_lambda[label as usize];
            *slot = slot.max(tree.point_exit[point].1);
        }
    }

    let probabilities = labels
        .iter()
        .enumerate()
        .map(|(point, &label)| {
            if label == NOISE_LABEL {
                return 0.0;
            }
            let max = max_lambda[label as usize];
            if max <= 0.0 {
                1.0
            } else {
                (tree.point_exit[point].1.min(max) / max) as f32
            }
        })
        .collect();

    HdbscanLabels {
        labels,
        probabilities,
        n_clusters: sorted.len(),
    }
}
