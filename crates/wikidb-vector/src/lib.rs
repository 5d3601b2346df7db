//! LanceDB-backed similarity search over article embeddings.
//!
//! The table is built elsewhere; this crate only opens it and answers
//! queries. Prompts are embedded and sent as a query vector through the
//! builder API, so prompt text is never spliced into a filter expression.
//!
//! The percentile threshold is applied to the table's stored `percentile`
//! column inside the engine. Tables without that column fall back to a
//! cutoff on cosine similarity (`1 - _distance`).

use anyhow::{anyhow, bail, Result};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, DistanceType, Table};
use std::path::Path;

use wikidb_core::error::Error;
use wikidb_core::traits::{EmbeddingSearch, Embedder};
use wikidb_core::types::{Candidate, SearchRequest};

pub mod schema;

use schema::{build_articles_schema, DISTANCE_COLUMN, ID_COLUMN, PERCENTILE_COLUMN, TEXT_COLUMN, VECTOR_COLUMN};

/// Blocking facade over an async LanceDB table. Owns its runtime, so it must
/// not be called from inside another runtime's async context.
pub struct LanceEmbeddingSearch {
    runtime: tokio::runtime::Runtime,
    table: Table,
    embedder: Box<dyn Embedder>,
    threshold: Threshold,
}

/// What the request percentile is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// The row's stored `percentile` value, filtered by the engine.
    Column,
    /// `1 - cosine distance`, for tables without a percentile column.
    Similarity,
}

impl LanceEmbeddingSearch {
    pub fn open(db_path: &Path, table_name: &str, embedder: Box<dyn Embedder>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        let uri = db_path.to_string_lossy().to_string();
        let table = runtime.block_on(async {
            let db = connect(&uri).execute().await?;
            db.open_table(table_name).execute().await
        })?;
        let schema = runtime.block_on(table.schema())?;
        let threshold = check_schema(&schema, embedder.dim())?;
        tracing::info!(db = %uri, table = table_name, dim = embedder.dim(), ?threshold, "opened article embeddings");
        Ok(Self { runtime, table, embedder, threshold })
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Nearest articles by cosine similarity, closest first, restricted to
    /// rows meeting the percentile threshold.
    pub fn nearest(&self, request: &SearchRequest) -> Result<Vec<Candidate>> {
        if request.limit == 0 {
            return Ok(Vec::new());
        }
        let vector = self
            .embedder
            .embed_batch(&[request.prompt.clone()])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector"))?;

        let batches: Vec<RecordBatch> = self.runtime.block_on(async {
            let mut query = self
                .table
                .vector_search(vector)?
                .column(VECTOR_COLUMN)
                .distance_type(DistanceType::Cosine)
                .limit(request.limit);
            if self.threshold == Threshold::Column {
                // percentile is a validated f32, never caller text
                query = query.only_if(format!("{PERCENTILE_COLUMN} >= {}", request.percentile));
            }
            let stream = query.execute().await?;
            stream.try_collect::<Vec<_>>().await
        })?;

        let min_similarity = match self.threshold {
            Threshold::Column => None,
            Threshold::Similarity => Some(request.percentile),
        };
        let mut candidates = Vec::new();
        for batch in &batches {
            collect_candidates(batch, min_similarity, &mut candidates)?;
        }
        candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Ok(candidates)
    }
}

impl EmbeddingSearch for LanceEmbeddingSearch {
    fn query(&self, request: &SearchRequest) -> wikidb_core::error::Result<Vec<Candidate>> {
        self.nearest(request).map_err(|e| Error::search(request.prompt.as_str(), e))
    }
}

// `id` and `vector` must match the articles layout for this embedder width;
// `text` is optional and `percentile` decides how thresholds are applied.
fn check_schema(schema: &Schema, dim: usize) -> Result<Threshold> {
    let expected = build_articles_schema(i32::try_from(dim)?);
    for name in [ID_COLUMN, VECTOR_COLUMN] {
        let want = expected.field_with_name(name)?.data_type();
        match schema.field_with_name(name).map(|f| f.data_type()) {
            Ok(found) if same_shape(found, want) => {}
            Ok(found) => bail!("'{name}' column is {found}, expected {want} for a {dim}-dimension embedder"),
            Err(_) => bail!("embeddings table has no '{name}' column"),
        }
    }
    Ok(match schema.field_with_name(PERCENTILE_COLUMN).map(|f| f.data_type()) {
        Ok(DataType::Float32 | DataType::Float64) => Threshold::Column,
        Ok(other) => bail!("'{PERCENTILE_COLUMN}' column must be a float, found {other}"),
        Err(_) => Threshold::Similarity,
    })
}

// List item names and nullability vary between writers; only the element
// type and width matter.
fn same_shape(found: &DataType, want: &DataType) -> bool {
    match (found, want) {
        (DataType::FixedSizeList(f, n), DataType::FixedSizeList(w, m)) => n == m && f.data_type() == w.data_type(),
        _ => found == want,
    }
}

fn collect_candidates(batch: &RecordBatch, min_similarity: Option<f32>, out: &mut Vec<Candidate>) -> Result<()> {
    let ids = batch
        .column_by_name(ID_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("result batch has no '{ID_COLUMN}' column"))?;
    let distances = batch
        .column_by_name(DISTANCE_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| anyhow!("result batch has no '{DISTANCE_COLUMN}' column"))?;
    let texts = batch
        .column_by_name(TEXT_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());

    for row in 0..batch.num_rows() {
        let similarity = 1.0 - distances.value(row);
        if min_similarity.is_some_and(|min| similarity < min) {
            continue;
        }
        out.push(Candidate {
            id: ids.value(row).to_string(),
            text: texts.filter(|t| t.is_valid(row)).map(|t| t.value(row).to_string()),
            similarity,
        });
    }
    Ok(())
}
