use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const ID_COLUMN: &str = "id";
pub const TEXT_COLUMN: &str = "text";
pub const VECTOR_COLUMN: &str = "vector";
/// Popularity rank of the article in `[0, 1]`, stored per row.
pub const PERCENTILE_COLUMN: &str = "percentile";
pub const DISTANCE_COLUMN: &str = "_distance";

/// Layout of the article embeddings table: one row per corpus title.
pub fn build_articles_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(ID_COLUMN, DataType::Utf8, false),
        Field::new(TEXT_COLUMN, DataType::Utf8, true),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
        Field::new(PERCENTILE_COLUMN, DataType::Float32, true),
    ]))
}
