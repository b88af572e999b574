//! `count`, `clusters`, `cluster-all` and `members` commands

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use learning_memory_core::clustering::{ClusterInfo, NamedCluster};
use learning_memory_core::types::{Axis, ClusterId};
use learning_memory_core::values::Experience;

use super::{parse_axis, print_json, Context};
use crate::error::CliError;

/// Arguments for `count`
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Restrict to one axis (full, strategy, surprise, root_cause)
    #[arg(long, value_parser = parse_axis)]
    pub axis: Option<Axis>,
}

/// Arguments for `clusters`
#[derive(Args, Debug)]
pub struct ClustersArgs {
    /// Axis to cluster (full, strategy, surprise, root_cause)
    #[arg(value_parser = parse_axis)]
    pub axis: Axis,

    /// Only cluster experiences with this `domain` (full axis only)
    #[arg(long)]
    pub domain: Option<String>,

    /// Include centroid vectors in the output
    #[arg(long)]
    pub centroids: bool,
}

/// Arguments for `cluster-all`
#[derive(Args, Debug)]
pub struct ClusterAllArgs {
    /// Include centroid vectors in the output
    #[arg(long)]
    pub centroids: bool,
}

/// Arguments for `members`
#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Cluster identifier, e.g. `full_0`
    pub cluster_id: String,

    /// Include member embeddings in the output
    #[arg(long)]
    pub embeddings: bool,
}

/// One cluster as printed by the CLI.
#[derive(Serialize, Debug)]
struct ClusterView {
    cluster_id: ClusterId,
    size: usize,
    avg_weight: f32,
    member_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    centroid: Option<Vec<f32>>,
}

impl ClusterView {
    fn new(cluster: NamedCluster, with_centroid: bool) -> Self {
        let NamedCluster {
            cluster_id, info, ..
        } = cluster;
        Self {
            cluster_id,
            size: info.size,
            avg_weight: info.avg_weight,
            member_ids: info.member_ids,
            centroid: with_centroid.then_some(info.centroid),
        }
    }

    fn from_info(axis: Axis, info: ClusterInfo, with_centroid: bool) -> Self {
        Self::new(NamedCluster::new(axis, info), with_centroid)
    }
}

#[derive(Serialize, Debug)]
struct MemberView {
    id: String,
    weight: f32,
    payload: learning_memory_core::traits::Payload,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
}

impl MemberView {
    fn new(member: Experience, with_embedding: bool) -> Self {
        Self {
            id: member.id,
            weight: member.weight,
            payload: member.payload,
            embedding: with_embedding.then_some(member.embedding),
        }
    }
}

/// Execute the count command.
pub async fn count_command(ctx: &Context, args: CountArgs) -> Result<(), CliError> {
    let clusterer = ctx.value_store()?.clusterer().clone();
    let axes: Vec<Axis> = match args.axis {
        Some(axis) => vec![axis],
        None => Axis::all().collect(),
    };

    let mut counts = BTreeMap::new();
    for axis in axes {
        counts.insert(axis, clusterer.count_experiences(axis).await?);
    }
    print_json(&counts)
}

/// Execute the clusters command.
pub async fn clusters_command(ctx: &Context, args: ClustersArgs) -> Result<(), CliError> {
    let values = ctx.value_store()?;

    let views: Vec<ClusterView> = match args.domain {
        Some(_) if args.axis != Axis::Full => {
            return Err(CliError::Usage(format!(
                "--domain applies to the full axis only, got '{}'",
                args.axis
            )))
        }
        Some(domain) => values
            .clusterer()
            .cluster_domain(&domain)
            .await?
            .into_iter()
            .map(|info| ClusterView::from_info(Axis::Full, info, args.centroids))
            .collect(),
        None => values
            .get_clusters(args.axis)
            .await?
            .into_iter()
            .map(|c| ClusterView::new(c, args.centroids))
            .collect(),
    };
    print_json(&views)
}

/// Execute the cluster-all command.
pub async fn cluster_all_command(ctx: &Context, args: ClusterAllArgs) -> Result<(), CliError> {
    let values = ctx.value_store()?;
    let by_axis = values.clusterer().cluster_all_axes().await?;

    let views: BTreeMap<Axis, Vec<ClusterView>> = by_axis
        .into_iter()
        .map(|(axis, clusters)| {
            let views = clusters
                .into_iter()
                .map(|info| ClusterView::from_info(axis, info, args.centroids))
                .collect();
            (axis, views)
        })
        .collect();
    print_json(&views)
}

/// Execute the members command.
pub async fn members_command(ctx: &Context, args: MembersArgs) -> Result<(), CliError> {
    let members = ctx.value_store()?.get_cluster_members(&args.cluster_id).await?;
    let views: Vec<MemberView> = members
        .into_iter()
        .map(|m| MemberView::new(m, args.embeddings))
        .collect();
    print_json(&views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use learning_memory_core::traits::{Payload, VectorRecord, VectorStore};

    async fn seeded_context(dir: &tempfile::TempDir) -> Context {
        let ctx = Context::load(None, &dir.path().join("store.json")).unwrap();
        ctx.store.ensure_collection("ghap_full", 4);
        for c in 0..2 {
            for p in 0..6 {
                let mut v = vec![0.0f32; 4];
                v[c * 2] = 1.0;
                v[c * 2 + 1] = 0.01 * (p as f32 + 1.0);
                ctx.store
                    .upsert("ghap_full", VectorRecord::new(format!("e{}{}", c, p), v, Payload::new()))
                    .await
                    .unwrap();
            }
        }
        ctx
    }

    #[test]
    fn test_cluster_view_hides_centroid_by_default() {
        let info = ClusterInfo {
            label: 1,
            centroid: vec![0.5; 4],
            member_ids: vec!["a".into()],
            size: 1,
            avg_weight: 0.5,
        };

        let json = serde_json::to_value(ClusterView::from_info(Axis::Surprise, info.clone(), false)).unwrap();
        assert_eq!(json["cluster_id"], "surprise_1");
        assert!(json.get("centroid").is_none());

        let json = serde_json::to_value(ClusterView::from_info(Axis::Surprise, info, true)).unwrap();
        assert_eq!(json["centroid"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn test_commands_run_against_seeded_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = seeded_context(&dir).await;

        count_command(&ctx, CountArgs { axis: None }).await.unwrap();
        clusters_command(
            &ctx,
            ClustersArgs {
                axis: Axis::Full,
                domain: None,
                centroids: false,
            },
        )
        .await
        .unwrap();
        cluster_all_command(&ctx, ClusterAllArgs { centroids: false })
            .await
            .unwrap();

        let clusters = ctx.value_store().unwrap().get_clusters(Axis::Full).await.unwrap();
        assert_eq!(clusters.len(), 2);
        members_command(
            &ctx,
            MembersArgs {
                cluster_id: clusters[0].cluster_id.to_string(),
                embeddings: false,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_missing_axis_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = seeded_context(&dir).await;

        let err = clusters_command(
            &ctx,
            ClustersArgs {
                axis: Axis::Strategy,
                domain: None,
                centroids: false,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("strategy"), "{}", err);

        let err = clusters_command(
            &ctx,
            ClustersArgs {
                axis: Axis::Surprise,
                domain: Some("networking".into()),
                centroids: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }
}
