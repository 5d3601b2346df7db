//! Persistence for the `title -> position` mapping.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use wikidb_core::error::{Error, Result};
use wikidb_core::traits::TitleIndexStorage;
use wikidb_core::types::Position;

/// One JSON object file, `{"<title>": <position>, ...}`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn err(&self, e: impl std::fmt::Display) -> Error {
        Error::Storage(format!("{}: {e}", self.path.display()))
    }
}

impl TitleIndexStorage for JsonFileStorage {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read(&self) -> Result<HashMap<String, Position>> {
        let file = File::open(&self.path).map_err(|e| self.err(e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| self.err(e))
    }

    // Written to a sibling temp file and renamed, so readers never see a
    // partially written index.
    fn write(&self, positions: &HashMap<String, Position>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.err(e))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(|e| self.err(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, positions).map_err(|e| self.err(e))?;
        writer.flush().map_err(|e| self.err(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.err(e))
    }
}

/// In-process storage that counts writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<(Option<HashMap<String, Position>>, usize)>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(positions: HashMap<String, Position>) -> Self {
        Self { state: Mutex::new((Some(positions), 0)) }
    }

    pub fn writes(&self) -> usize {
        self.state.lock().map(|state| state.1).unwrap_or_default()
    }
}

impl TitleIndexStorage for MemoryStorage {
    fn exists(&self) -> bool {
        self.state.lock().map(|state| state.0.is_some()).unwrap_or(false)
    }

    fn read(&self) -> Result<HashMap<String, Position>> {
        let state = self.state.lock().map_err(|_| Error::Storage("title index storage lock poisoned".to_string()))?;
        state.0.clone().ok_or_else(|| Error::Storage("no persisted title index".to_string()))
    }

    fn write(&self, positions: &HashMap<String, Position>) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::Storage("title index storage lock poisoned".to_string()))?;
        state.0 = Some(positions.clone());
        state.1 += 1;
        Ok(())
    }
}
