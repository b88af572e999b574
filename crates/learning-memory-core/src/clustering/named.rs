//! Clusters annotated with the axis they were computed on.

use serde::{Deserialize, Serialize};

use super::clusterer::ClusterInfo;
use crate::types::{Axis, ClusterId};

/// A [`ClusterInfo`] bound to its axis and stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    /// Axis the cluster was computed on.
    pub axis: Axis,
    /// `{axis}_{label}` identifier.
    pub cluster_id: ClusterId,
    /// Raw cluster data.
    #[serde(flatten)]
    pub info: ClusterInfo,
}

impl NamedCluster {
    /// Wrap a raw cluster. Labels from centroid computation are never negative.
    pub fn new(axis: Axis, info: ClusterInfo) -> Self {
        let label = u32::try_from(info.label).unwrap_or_default();
        Self {
            axis,
            cluster_id: ClusterId::new(axis, label),
            info,
        }
    }

    /// Number of members.
    #[inline]
    pub fn size(&self) -> usize {
        self.info.size
    }

    /// Weighted centroid.
    #[inline]
    pub fn centroid(&self) -> &[f32] {
        &self.info.centroid
    }

    /// Member identifiers.
    #[inline]
    pub fn member_ids(&self) -> &[String] {
        &self.info.member_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_cluster_serializes_flat() {
        let named = NamedCluster::new(
            Axis::Strategy,
            ClusterInfo {
                label: 2,
                centroid: vec![0.5, 0.5],
                member_ids: vec!["a".into(), "b".into()],
                size: 2,
                avg_weight: 0.9,
            },
        );

        assert_eq!(named.cluster_id.to_string(), "strategy_2");
        let json = serde_json::to_value(&named).unwrap();
        assert_eq!(json["cluster_id"], "strategy_2");
        assert_eq!(json["axis"], "strategy");
        assert_eq!(json["size"], 2);
        assert_eq!(json["label"], 2);
    }
}
