//! File store of checksummed JSON lines
//!
//! One change-set per line:
//!
//! ```text
//! 1f2e3d4c {"revision":1,"commit":{...}}
//! ```
//!
//! The writer stages lines in memory and appends them when a change-set
//! carrying a commit marker arrives. The append is followed by fsync; only
//! then does the commit count as durable.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::event::{is_concrete, ChangeSet, Revision};

use super::checksum::{seal, unseal};
use super::contract::{check_order, ChangeSetReader, DestinationStore, ReplayWriter, SourceStore};
use super::errors::{StoreError, StoreResult};

/// A store backed by a single JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Opens the store at `path`, creating an empty file (and parent
    /// directories) if missing.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::io(format!("Failed to create directory {}", parent.display()), e)
                })?;
            }
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(format!("Failed to open store {}", path.display()), e))?;
        Ok(Self { path })
    }

    /// Opens an existing store. A missing file is an error.
    pub fn open_existing(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(StoreError::io(
                format!("Store not found: {}", path.display()),
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }
        Ok(Self { path })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_reader(&self, start: Revision, stop: Revision) -> StoreResult<JsonlReader> {
        let file = File::open(&self.path)
            .map_err(|e| StoreError::io(format!("Failed to open store {}", self.path.display()), e))?;
        Ok(JsonlReader {
            lines: Some(BufReader::new(file)),
            line_number: 0,
            start,
            stop,
        })
    }
}

impl SourceStore for JsonlStore {
    fn read_change_sets(&self, start: Revision, stop: Revision) -> StoreResult<Box<dyn ChangeSetReader + '_>> {
        Ok(Box::new(self.open_reader(start, stop)?))
    }
}

impl DestinationStore for JsonlStore {
    fn last_revision(&self) -> StoreResult<Revision> {
        let mut reader = self.open_reader(Revision::MIN, Revision::MAX)?;
        let mut last = 0;
        while let Some(cs) = reader.read()? {
            if cs.is_committed() && is_concrete(cs.revision) {
                last = last.max(cs.revision);
            }
        }
        reader.close()?;
        Ok(last)
    }

    fn replay_writer(&mut self) -> StoreResult<Box<dyn ReplayWriter + '_>> {
        let last_committed = self.last_revision()?;
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(format!("Failed to open store {}", self.path.display()), e))?;
        Ok(Box::new(JsonlWriter {
            file: Some(file),
            staged: Vec::new(),
            staged_last: last_committed,
            last_committed,
        }))
    }
}

/// Sequential reader over a store file.
pub struct JsonlReader {
    lines: Option<BufReader<File>>,
    line_number: u64,
    start: Revision,
    stop: Revision,
}

impl ChangeSetReader for JsonlReader {
    fn read(&mut self) -> StoreResult<Option<ChangeSet>> {
        let reader = self.lines.as_mut().ok_or(StoreError::Closed("reader"))?;
        let mut buf = String::new();
        loop {
            buf.clear();
            let n = reader
                .read_line(&mut buf)
                .map_err(|e| StoreError::io(format!("Failed to read line {}", self.line_number + 1), e))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            if !buf.ends_with('\n') {
                return Err(StoreError::Corruption {
                    line: self.line_number,
                    reason: "truncated line".to_string(),
                });
            }
            let payload = unseal(line).map_err(|reason| StoreError::Corruption {
                line: self.line_number,
                reason,
            })?;
            let cs: ChangeSet = serde_json::from_str(payload).map_err(|e| StoreError::Corruption {
                line: self.line_number,
                reason: format!("invalid change-set: {}", e),
            })?;
            if cs.revision >= self.start && cs.revision < self.stop {
                return Ok(Some(cs));
            }
        }
    }

    fn close(&mut self) -> StoreResult<()> {
        self.lines = None;
        Ok(())
    }
}

/// Append target that can be cut back to an earlier length.
trait AppendLog: Write {
    fn end(&self) -> io::Result<u64>;
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl AppendLog for File {
    fn end(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Appends `chunk` and syncs it. On failure the log is cut back to its
/// previous length so no torn line survives.
fn append_or_rollback<L: AppendLog>(log: &mut L, chunk: &[u8]) -> io::Result<()> {
    let end = log.end()?;
    let appended = log.write_all(chunk).and_then(|_| log.sync());
    if let Err(e) = appended {
        if let Err(undo) = log.truncate(end).and_then(|_| log.sync()) {
            warn!(error = %undo, len = end, "Failed to cut back torn append");
        }
        return Err(e);
    }
    Ok(())
}

/// Appending writer with fsync at every commit.
pub struct JsonlWriter {
    file: Option<File>,
    staged: Vec<String>,
    staged_last: Revision,
    last_committed: Revision,
}

impl ReplayWriter for JsonlWriter {
    fn write(&mut self, change_set: ChangeSet) -> StoreResult<()> {
        if self.file.is_none() {
            return Err(StoreError::Closed("writer"));
        }
        check_order(self.staged_last, &change_set)?;
        let payload = serde_json::to_string(&change_set)?;
        self.staged.push(seal(&payload));
        if change_set.is_committed() {
            if is_concrete(change_set.revision) {
                self.staged_last = change_set.revision;
            }
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        let file = self.file.as_mut().ok_or(StoreError::Closed("writer"))?;
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut chunk = String::new();
        for line in self.staged.drain(..) {
            chunk.push_str(&line);
            chunk.push('\n');
        }

        let last_committed = self.last_committed;
        append_or_rollback(file, chunk.as_bytes()).map_err(|e| StoreError::CommitFailed {
            last_committed,
            reason: e.to_string(),
        })?;

        debug!(revision = self.staged_last, bytes = chunk.len(), "Committed to file store");
        self.last_committed = self.staged_last;
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        self.flush()?;
        self.file = None;
        Ok(())
    }

    fn abort(&mut self) -> StoreResult<()> {
        if !self.staged.is_empty() {
            debug!(lines = self.staged.len(), "Discarding uncommitted change-sets");
        }
        self.staged.clear();
        self.staged_last = self.last_committed;
        self.file = None;
        Ok(())
    }

    fn last_committed(&self) -> Revision {
        self.last_committed
    }
}
