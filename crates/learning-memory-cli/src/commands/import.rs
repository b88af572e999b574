//! `import` command
//!
//! # Input (one JSON object per line)
//!
//! ```json
//! {"id": "exp-1", "axis": "full", "text": "retry with backoff fixed it", "confidence_tier": "gold", "domain": "networking"}
//! {"axis": "strategy", "vector": [0.1, 0.2, 0.3]}
//! ```
//!
//! - `axis` is required
//! - `vector` is used as-is and must have `embedding.dimension` components;
//!   otherwise `text` is embedded
//! - `id` defaults to a fresh UUID
//! - every other field is stored as metadata
//!
//! Blank lines are skipped. The first bad line aborts the import and nothing
//! is saved.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use learning_memory_core::traits::{EmbeddingService, Payload, VectorRecord, VectorStore};
use learning_memory_core::types::Axis;

use super::{print_json, Context};
use crate::error::CliError;

/// Arguments for `import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON-lines file, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Deserialize, Debug)]
struct ImportLine {
    id: Option<String>,
    axis: String,
    vector: Option<Vec<f32>>,
    text: Option<String>,
    #[serde(flatten)]
    metadata: Payload,
}

#[derive(Serialize, Debug, Default)]
struct ImportSummary {
    imported: usize,
    by_axis: BTreeMap<Axis, usize>,
}

/// Execute the import command.
pub async fn import_command(ctx: &Context, args: ImportArgs) -> Result<(), CliError> {
    let source = args.file.display().to_string();
    let reader: Box<dyn Read> = if source == "-" {
        Box::new(std::io::stdin())
    } else {
        Box::new(std::fs::File::open(&args.file).map_err(|e| CliError::Io {
            path: source.clone(),
            message: e.to_string(),
        })?)
    };

    let mut records: Vec<(Axis, VectorRecord)> = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|e| CliError::Io {
            path: source.clone(),
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(ctx, index + 1, &line).await?);
    }

    let mut summary = ImportSummary::default();
    for (axis, record) in records {
        let collection = ctx.config.collections.collection(axis);
        let dimension = record.vector.as_ref().map_or(0, Vec::len);
        ctx.store.ensure_collection(collection, dimension);
        ctx.store.upsert(collection, record).await?;

        summary.imported += 1;
        *summary.by_axis.entry(axis).or_default() += 1;
    }

    ctx.save()?;
    info!(imported = summary.imported, source = %source, "Import complete");
    print_json(&summary)
}

async fn parse_line(ctx: &Context, line: usize, raw: &str) -> Result<(Axis, VectorRecord), CliError> {
    let input_error = |message: String| CliError::Input { line, message };

    let parsed: ImportLine = serde_json::from_str(raw).map_err(|e| input_error(e.to_string()))?;
    let axis: Axis = parsed.axis.parse().map_err(|e: learning_memory_core::LearningError| {
        input_error(e.to_string())
    })?;

    let mut payload = parsed.metadata;
    let vector = match (parsed.vector, parsed.text) {
        (Some(vector), text) => {
            if let Some(text) = text {
                payload.insert("text".to_string(), text.into());
            }
            vector
        }
        (None, Some(text)) => {
            let vector = ctx
                .embeddings
                .embed(&text)
                .await
                .map_err(|e| input_error(e.to_string()))?;
            payload.insert("text".to_string(), text.into());
            vector
        }
        (None, None) => return Err(input_error("either 'vector' or 'text' is required".into())),
    };

    if vector.is_empty() {
        return Err(input_error("'vector' must not be empty".into()));
    }
    let dimension = ctx.config.embedding.dimension;
    if vector.len() != dimension {
        return Err(input_error(format!(
            "'vector' has {} dimensions, expected {} (embedding.dimension)",
            vector.len(),
            dimension
        )));
    }

    let id = parsed.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    Ok((axis, VectorRecord::new(id, vector, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn context(dir: &tempfile::TempDir) -> Context {
        Context::load(None, &dir.path().join("store.json")).unwrap()
    }

    /// Context whose embedding dimension is `dimension`.
    fn context_with_dimension(dir: &tempfile::TempDir, dimension: usize) -> Context {
        let config = dir.path().join("learning.toml");
        std::fs::write(&config, format!("[embedding]\ndimension = {}\n", dimension)).unwrap();
        Context::load(Some(config.as_path()), &dir.path().join("store.json")).unwrap()
    }

    #[tokio::test]
    async fn test_parse_line_variants() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with_dimension(&dir, 2);

        let (axis, record) = parse_line(
            &ctx,
            1,
            r#"{"id": "e1", "axis": "root_cause", "vector": [1.0, 0.0], "confidence_tier": "gold"}"#,
        )
        .await
        .unwrap();
        assert_eq!(axis, Axis::RootCause);
        assert_eq!(record.id, "e1");
        assert_eq!(record.vector, Some(vec![1.0, 0.0]));
        assert_eq!(record.payload["confidence_tier"], "gold");
        assert!(record.payload.get("axis").is_none());

        let (_, embedded) = parse_line(&ctx, 2, r#"{"axis": "full", "text": "flaky test"}"#)
            .await
            .unwrap();
        assert_eq!(embedded.vector.map(|v| v.len()), Some(ctx.config.embedding.dimension));
        assert_eq!(embedded.payload["text"], "flaky test");
        assert!(!embedded.id.is_empty());
    }

    #[tokio::test]
    async fn test_parse_line_errors_carry_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with_dimension(&dir, 1);

        for raw in [
            r#"{"axis": "galaxy", "vector": [1.0]}"#,
            r#"{"axis": "full"}"#,
            r#"{"axis": "full", "vector": []}"#,
            "not json",
        ] {
            let err = parse_line(&ctx, 7, raw).await.unwrap_err();
            assert!(err.to_string().starts_with("Line 7:"), "{}", err);
        }
    }

    #[tokio::test]
    async fn test_vector_width_must_match_embedding_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let err = parse_line(&ctx, 3, r#"{"axis": "full", "vector": [1.0, 0.0, 0.0]}"#)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Line 3:"), "{}", msg);
        assert!(
            msg.contains("has 3 dimensions") && msg.contains(&ctx.config.embedding.dimension.to_string()),
            "{}",
            msg
        );
        println!("[PASS] test_vector_width_must_match_embedding_dimension - {}", msg);
    }

    #[tokio::test]
    async fn test_import_file_saves_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with_dimension(&dir, 3);

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "a", "axis": "full", "vector": [1.0, 0.0, 0.0]}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id": "b", "axis": "full", "vector": [0.0, 1.0, 0.0]}}"#).unwrap();

        import_command(
            &ctx,
            ImportArgs {
                file: file.path().to_path_buf(),
            },
        )
        .await
        .unwrap();

        let reloaded = Context::load(None, &dir.path().join("store.json")).unwrap();
        assert_eq!(reloaded.store.count("ghap_full", None).await.unwrap(), 2);
        assert_eq!(reloaded.store.dimension_of("ghap_full"), Some(3));
    }
}
