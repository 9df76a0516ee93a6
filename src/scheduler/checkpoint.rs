//! Checkpoint persistence: a key-value store of per-clump records keyed by
//! clump index, injected into the scheduler so persistence format and
//! scheduling logic stay decoupled.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::SegmentError;
use crate::types::Contour;

/// One clump's persisted stage output.
///
/// `cells` holds each cell's boundary contour as `[x, y]` integer pairs in
/// clump-local coordinates; a `None` entry marks a cell that was never
/// written. Association records additionally carry the neighbor indices.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClumpRecord {
    pub cells: Vec<Option<Contour>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbors: Vec<Vec<usize>>,
}

impl ClumpRecord {
    /// A record is complete ("fully loaded") only when every one of the
    /// clump's current cells has a non-null contour. Anything less — fewer
    /// entries after a partial write, or a null from an interrupted batch —
    /// causes the whole clump to be reprocessed.
    pub fn is_complete(&self, cell_count: usize) -> bool {
        cell_count > 0 && self.cells.len() == cell_count && self.cells.iter().all(Option::is_some)
    }
}

/// Key-value checkpoint store keyed by clump index.
pub trait CheckpointStore: Send {
    fn get(&self, clump_idx: usize) -> Option<ClumpRecord>;
    fn put(&mut self, clump_idx: usize, record: ClumpRecord);
    /// Persist buffered records to durable storage.
    fn flush(&mut self) -> Result<(), SegmentError>;
}

/// Volatile store for callers that do not need resumability (and for tests).
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    records: BTreeMap<usize, ClumpRecord>,
}

impl CheckpointStore for MemoryCheckpointStore {
    fn get(&self, clump_idx: usize) -> Option<ClumpRecord> {
        self.records.get(&clump_idx).cloned()
    }

    fn put(&mut self, clump_idx: usize, record: ClumpRecord) {
        self.records.insert(clump_idx, record);
    }

    fn flush(&mut self) -> Result<(), SegmentError> {
        Ok(())
    }
}

/// JSON-file store: one human-diffable document mapping clump index to
/// record, loaded eagerly and rewritten on flush.
#[derive(Debug)]
pub struct JsonCheckpointStore {
    path: PathBuf,
    records: BTreeMap<usize, ClumpRecord>,
    dirty: bool,
}

impl JsonCheckpointStore {
    /// Open the store at `path`, reading any existing document. A file that
    /// fails to parse is treated as an empty store (every clump reprocesses)
    /// rather than aborting the batch.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SegmentError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(records) => records,
                Err(err) => {
                    warn!("checkpoint {}: unreadable, starting fresh: {err}", path.display());
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            records,
            dirty: false,
        })
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn get(&self, clump_idx: usize) -> Option<ClumpRecord> {
        self.records.get(&clump_idx).cloned()
    }

    fn put(&mut self, clump_idx: usize, record: ClumpRecord) {
        self.records.insert(clump_idx, record);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<(), SegmentError> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)?;
        self.dirty = false;
        Ok(())
    }
}
