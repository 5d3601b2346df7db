use std::path::Path;
use std::sync::Arc;

use arrow_array::types::Float32Type;
use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};

use wikidb_core::error::Error;
use wikidb_core::traits::{EmbeddingSearch, Embedder};
use wikidb_core::types::SearchRequest;
use wikidb_embed::FakeEmbedder;
use wikidb_vector::schema::build_articles_schema;
use wikidb_vector::{LanceEmbeddingSearch, Threshold};

const DIM: i32 = 64;
const TABLE: &str = "articles";

// (id, text, stored popularity percentile)
const DOCS: &[(&str, &str, f32)] = &[
    ("Solar eclipse", "solar eclipse moon shadow", 0.3),
    ("Basalt", "volcanic basalt lava rock", 0.2),
    ("Tide", "ocean tide moon gravity", 0.97),
];

/// Seed the articles table; without `with_percentile` the popularity column
/// is left out, as in tables written by older tooling.
fn seed(dir: &Path, with_percentile: bool) -> anyhow::Result<()> {
    let embedder = FakeEmbedder::new(DIM as usize);
    let texts: Vec<String> = DOCS.iter().map(|(_, text, _)| text.to_string()).collect();
    let vectors = embedder.embed_batch(&texts)?;
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(DOCS.iter().map(|(id, _, _)| *id).collect::<Vec<_>>())),
        Arc::new(StringArray::from(texts)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect::<Vec<_>>())),
            DIM,
        )),
    ];
    let full = build_articles_schema(DIM);
    let schema = if with_percentile {
        columns.push(Arc::new(Float32Array::from(DOCS.iter().map(|(_, _, p)| *p).collect::<Vec<_>>())));
        full
    } else {
        Arc::new(full.project(&[0, 1, 2])?)
    };
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let uri = dir.to_string_lossy().to_string();
    tokio::runtime::Runtime::new()?.block_on(async {
        let db = lancedb::connect(&uri).execute().await?;
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        db.create_table(TABLE, reader).execute().await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn open(dir: &Path) -> LanceEmbeddingSearch {
    LanceEmbeddingSearch::open(dir, TABLE, Box::new(FakeEmbedder::new(DIM as usize))).expect("open table")
}

#[test]
fn exact_text_is_the_closest_hit() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    seed(tmp.path(), true)?;
    let search = open(tmp.path());

    let hits = search.query(&SearchRequest::new("solar eclipse moon shadow", 0.0, 3)?)?;
    assert!(!hits.is_empty());
    assert_eq!(hits[0].id, "Solar eclipse");
    assert!((hits[0].similarity - 1.0).abs() < 1e-4, "similarity={}", hits[0].similarity);
    assert_eq!(hits[0].text.as_deref(), Some("solar eclipse moon shadow"));
    for pair in hits.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity, "descending similarity");
    }
    Ok(())
}

#[test]
fn percentile_filters_on_the_stored_column() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    seed(tmp.path(), true)?;
    let search = open(tmp.path());
    assert_eq!(search.threshold(), Threshold::Column);

    // The exact match is the most similar row but is not popular enough.
    let hits = search.query(&SearchRequest::new("solar eclipse moon shadow", 0.95, 3)?)?;
    let ids: Vec<&str> = hits.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["Tide"]);
    assert!(hits[0].similarity < 0.99, "kept despite low similarity: {}", hits[0].similarity);

    let loose = search.query(&SearchRequest::new("solar eclipse moon shadow", 0.25, 3)?)?;
    let ids: Vec<&str> = loose.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids[0], "Solar eclipse");
    assert!(ids.contains(&"Tide"));
    assert!(!ids.contains(&"Basalt"), "stored percentile 0.2 is below 0.25");
    Ok(())
}

#[test]
fn tables_without_percentile_fall_back_to_similarity() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    seed(tmp.path(), false)?;
    let search = open(tmp.path());
    assert_eq!(search.threshold(), Threshold::Similarity);

    let strict = search.query(&SearchRequest::new("solar eclipse moon shadow", 0.99, 3)?)?;
    let ids: Vec<&str> = strict.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["Solar eclipse"]);
    assert!(strict.iter().all(|c| c.similarity >= 0.99));
    Ok(())
}

#[test]
fn limit_caps_hit_count() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    seed(tmp.path(), true)?;
    let search = open(tmp.path());

    assert_eq!(search.query(&SearchRequest::new("moon", 0.0, 1)?)?.len(), 1);
    assert!(search.query(&SearchRequest::new("moon", 0.0, 0)?)?.is_empty());
    Ok(())
}

#[test]
fn dimension_mismatch_is_rejected_on_open() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    seed(tmp.path(), true)?;
    let result = LanceEmbeddingSearch::open(tmp.path(), TABLE, Box::new(FakeEmbedder::new(32)));
    assert!(result.is_err());
    Ok(())
}

#[test]
fn missing_table_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let result = LanceEmbeddingSearch::open(tmp.path(), "absent", Box::new(FakeEmbedder::new(DIM as usize)));
    assert!(result.is_err());
}

#[test]
fn engine_failures_surface_as_search_errors() -> anyhow::Result<()> {
    struct Broken;
    impl Embedder for Broken {
        fn dim(&self) -> usize {
            DIM as usize
        }
        fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            anyhow::bail!("model crashed")
        }
    }

    let tmp = tempfile::tempdir()?;
    seed(tmp.path(), true)?;
    let search = LanceEmbeddingSearch::open(tmp.path(), TABLE, Box::new(Broken))?;
    let err = search.query(&SearchRequest::new("moon", 0.5, 2)?).unwrap_err();
    assert!(matches!(&err, Error::Search { prompt, .. } if prompt == "moon"));
    assert!(err.to_string().contains("model crashed"));
    Ok(())
}
