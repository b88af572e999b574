//! `validate`, `store-value` and `list-values` commands

use clap::Args;
use serde::Serialize;

use learning_memory_core::types::{Axis, ClusterId};
use learning_memory_core::values::{Value, ValueValidation};

use super::{parse_axis, print_json, Context};
use crate::error::CliError;

/// Arguments for `validate`
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Cluster identifier, e.g. `strategy_2`
    pub cluster_id: String,
    /// Candidate value text
    pub text: String,
}

/// Arguments for `store-value`
#[derive(Args, Debug)]
pub struct StoreValueArgs {
    /// Cluster identifier, e.g. `strategy_2`
    pub cluster_id: String,
    /// Value text
    pub text: String,
    /// Axis of the cluster; defaults to the axis in the cluster id
    #[arg(long, value_parser = parse_axis)]
    pub axis: Option<Axis>,
}

/// Arguments for `list-values`
#[derive(Args, Debug)]
pub struct ListValuesArgs {
    /// Restrict to one axis
    #[arg(long, value_parser = parse_axis)]
    pub axis: Option<Axis>,

    /// Include value embeddings in the output
    #[arg(long)]
    pub embeddings: bool,
}

/// A stored value as printed by the CLI.
#[derive(Serialize, Debug)]
struct ValueView {
    id: String,
    text: String,
    cluster_id: ClusterId,
    axis: Axis,
    cluster_size: usize,
    created_at: String,
    validation: ValueValidation,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
}

impl ValueView {
    fn new(value: Value, with_embedding: bool) -> Self {
        Self {
            id: value.id,
            text: value.text,
            cluster_id: value.cluster_id,
            axis: value.axis,
            cluster_size: value.cluster_size,
            created_at: value.created_at.to_rfc3339(),
            validation: value.validation,
            embedding: with_embedding.then_some(value.embedding),
        }
    }
}

/// Execute the validate command. A rejected candidate still exits 0.
pub async fn validate_command(ctx: &Context, args: ValidateArgs) -> Result<(), CliError> {
    let result = ctx
        .value_store()?
        .validate_value_candidate(&args.text, &args.cluster_id)
        .await?;
    print_json(&result)
}

/// Execute the store-value command and save the snapshot.
pub async fn store_value_command(ctx: &Context, args: StoreValueArgs) -> Result<(), CliError> {
    let axis = match args.axis {
        Some(axis) => axis,
        None => args.cluster_id.parse::<ClusterId>()?.axis,
    };

    let value = ctx
        .value_store()?
        .store_value(&args.text, &args.cluster_id, axis)
        .await?;
    ctx.save()?;
    print_json(&ValueView::new(value, false))
}

/// Execute the list-values command.
pub async fn list_values_command(ctx: &Context, args: ListValuesArgs) -> Result<(), CliError> {
    let values = ctx.value_store()?.list_values(args.axis).await?;
    let views: Vec<ValueView> = values
        .into_iter()
        .map(|v| ValueView::new(v, args.embeddings))
        .collect();
    print_json(&views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use learning_memory_core::traits::{Payload, VectorRecord, VectorStore};

    async fn seeded_context(dir: &tempfile::TempDir) -> Context {
        let ctx = Context::load(None, &dir.path().join("store.json")).unwrap();
        let dim = ctx.config.embedding.dimension;
        ctx.store.ensure_collection("ghap_strategy", dim);
        for c in 0..2 {
            for p in 0..6 {
                let mut v = vec![0.0f32; dim];
                v[c * 2] = 1.0;
                v[c * 2 + 1] = 0.01 * (p as f32 + 1.0);
                ctx.store
                    .upsert("ghap_strategy", VectorRecord::new(format!("s{}{}", c, p), v, Payload::new()))
                    .await
                    .unwrap();
            }
        }
        ctx
    }

    #[tokio::test]
    async fn test_store_value_persists_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = seeded_context(&dir).await;

        let cluster = ctx
            .value_store()
            .unwrap()
            .get_clusters(Axis::Strategy)
            .await
            .unwrap()
            .remove(0);
        ctx.embeddings.pin("Narrow the failing input first", cluster.centroid().to_vec());

        validate_command(
            &ctx,
            ValidateArgs {
                cluster_id: cluster.cluster_id.to_string(),
                text: "Narrow the failing input first".into(),
            },
        )
        .await
        .unwrap();

        store_value_command(
            &ctx,
            StoreValueArgs {
                cluster_id: cluster.cluster_id.to_string(),
                text: "Narrow the failing input first".into(),
                axis: None,
            },
        )
        .await
        .unwrap();

        let reloaded = Context::load(None, &dir.path().join("store.json")).unwrap();
        let values = reloaded.value_store().unwrap().list_values(Some(Axis::Strategy)).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].text, "Narrow the failing input first");

        list_values_command(
            &reloaded,
            ListValuesArgs {
                axis: None,
                embeddings: false,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_store_value_axis_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = seeded_context(&dir).await;

        let err = store_value_command(
            &ctx,
            StoreValueArgs {
                cluster_id: "strategy_0".into(),
                text: "anything".into(),
                axis: Some(Axis::Full),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("does not match"), "{}", err);
    }

    #[test]
    fn test_value_view_omits_embedding() {
        let view = ValueView::new(
            Value {
                id: "value_full_0_x".into(),
                text: "t".into(),
                cluster_id: ClusterId::new(Axis::Full, 0),
                axis: Axis::Full,
                cluster_label: 0,
                embedding: vec![1.0],
                cluster_size: 5,
                created_at: chrono::Utc::now(),
                validation: ValueValidation {
                    similarity: 1.0,
                    metrics: learning_memory_core::values::ValidationMetrics {
                        candidate_distance: 0.0,
                        mean_distance: 0.1,
                        std_distance: 0.0,
                        threshold: 0.1,
                    },
                },
            },
            false,
        );
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("embedding").is_none());
        assert_eq!(json["validation"]["threshold"], 0.1);
    }
}
