//! Corpus backed by Arrow IPC files, as written by dataset tooling
//! (`wiki-dataset/train/*.arrow`).
//!
//! Every file under the corpus directory is read once at startup and kept as
//! column arrays. Positions run across files in sorted path order, so the same
//! directory always yields the same addressing.
//!
//! Files are decoded onto the heap, not memory-mapped: resident memory grows
//! with the whole `title` and `text` payload of the corpus. Only those two
//! columns are kept; any other columns are dropped after decoding.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use arrow_array::cast::AsArray;
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_ipc::reader::{FileReader, StreamReader};
use arrow_schema::DataType;

use wikidb_core::error::{Error, Result};
use wikidb_core::traits::CorpusStore;
use wikidb_core::types::{Position, Record};

const TITLE_COLUMN: &str = "title";
const TEXT_COLUMN: &str = "text";
const FILE_MAGIC: &[u8; 6] = b"ARROW1";

struct Segment {
    start: Position,
    rows: usize,
    title: ArrayRef,
    text: ArrayRef,
}

pub struct ArrowCorpus {
    segments: Vec<Segment>,
    size: usize,
}

impl ArrowCorpus {
    /// Load every `*.arrow` file under `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let files = list_arrow_files(dir);
        if files.is_empty() {
            return Err(Error::Storage(format!("no .arrow files found under {}", dir.display())));
        }
        let mut batches = Vec::new();
        for path in &files {
            tracing::debug!(path = %path.display(), "reading corpus file");
            batches.extend(read_batches(path)?);
        }
        let corpus = Self::from_batches(batches)?;
        tracing::info!(files = files.len(), records = corpus.size, dir = %dir.display(), "loaded corpus");
        Ok(corpus)
    }

    /// Build a corpus from in-memory batches, each carrying string `title` and
    /// `text` columns.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let mut segments = Vec::with_capacity(batches.len());
        let mut start = 0;
        for batch in batches {
            let rows = batch.num_rows();
            if rows == 0 {
                continue;
            }
            let title = string_column(&batch, TITLE_COLUMN)?;
            let text = string_column(&batch, TEXT_COLUMN)?;
            segments.push(Segment { start, rows, title, text });
            start += rows;
        }
        Ok(Self { segments, size: start })
    }

    fn locate(&self, position: Position) -> Result<(&Segment, usize)> {
        let idx = self.segments.partition_point(|s| s.start + s.rows <= position);
        self.segments
            .get(idx)
            .map(|segment| (segment, position - segment.start))
            .ok_or_else(|| Error::Storage(format!("position {position} out of range for corpus of {}", self.size)))
    }
}

impl CorpusStore for ArrowCorpus {
    fn get(&self, position: Position) -> Result<Record> {
        let (segment, row) = self.locate(position)?;
        Ok(Record { title: string_value(segment.title.as_ref(), row), text: string_value(segment.text.as_ref(), row) })
    }

    fn size(&self) -> usize {
        self.size
    }

    fn title(&self, position: Position) -> Result<String> {
        let (segment, row) = self.locate(position)?;
        Ok(string_value(segment.title.as_ref(), row))
    }
}

fn list_arrow_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("arrow"))
        .collect();
    files.sort();
    files
}

/// Arrow files come in two flavours: the random-access file format (starts
/// with `ARROW1`) and the streaming format used by most dataset writers.
fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let storage_err = |e: &dyn std::fmt::Display| Error::Storage(format!("{}: {e}", path.display()));
    let mut reader = BufReader::new(File::open(path).map_err(|e| storage_err(&e))?);

    let mut magic = [0u8; 6];
    let is_file_format = match reader.read_exact(&mut magic) {
        Ok(()) => &magic == FILE_MAGIC,
        Err(_) => false,
    };
    reader.seek(SeekFrom::Start(0)).map_err(|e| storage_err(&e))?;

    let batches: std::result::Result<Vec<_>, _> = if is_file_format {
        FileReader::try_new(reader, None).map_err(|e| storage_err(&e))?.collect()
    } else {
        StreamReader::try_new(reader, None).map_err(|e| storage_err(&e))?.collect()
    };
    batches.map_err(|e| storage_err(&e))
}

fn string_column(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| Error::Storage(format!("corpus batch has no '{name}' column")))?;
    match column.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => Ok(column.clone()),
        other => Err(Error::Storage(format!("corpus column '{name}' must be a string column, found {other}"))),
    }
}

// Nulls read as empty strings.
fn string_value(column: &dyn Array, row: usize) -> String {
    if column.is_null(row) {
        return String::new();
    }
    if let Some(values) = column.as_string_opt::<i32>() {
        return values.value(row).to_owned();
    }
    column.as_string_opt::<i64>().map(|values| values.value(row).to_owned()).unwrap_or_default()
}
