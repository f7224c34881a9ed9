//! Command history sinks.
//!
//! Every non-empty line a terminal receives is recorded with a timestamp,
//! whether or not it resolves to a command. Entries are retrieved newest
//! first.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thyme_types::config::HistoryConfig;
use thyme_types::error::Result;

/// One recorded input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only store of command lines.
pub trait HistoryStore: Send + Sync {
    fn record(&self, command: &str, timestamp: DateTime<Utc>) -> Result<()>;

    /// The `i`-th most recent entry (0 = newest). An index past the oldest
    /// entry is clamped to it; the index actually used is returned alongside.
    /// `None` only when the history is empty.
    fn nth_most_recent(&self, i: usize) -> Option<(HistoryEntry, usize)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `count` entries, newest first.
    fn recent(&self, count: usize) -> Vec<HistoryEntry> {
        (0..count.min(self.len()))
            .filter_map(|i| self.nth_most_recent(i).map(|(entry, _)| entry))
            .collect()
    }
}

/// In-memory history, optionally bounded.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    /// Maximum retained entries; 0 = unbounded.
    capacity: usize,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Insert keeping timestamp order; equal timestamps keep arrival order.
    fn insert(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let pos = entries.partition_point(|e| e.timestamp <= entry.timestamp);
        entries.insert(pos, entry);
        if self.capacity > 0 {
            while entries.len() > self.capacity {
                entries.pop_front();
            }
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HistoryStore for MemoryHistory {
    fn record(&self, command: &str, timestamp: DateTime<Utc>) -> Result<()> {
        self.insert(HistoryEntry {
            command: command.to_string(),
            timestamp,
        });
        Ok(())
    }

    fn nth_most_recent(&self, i: usize) -> Option<(HistoryEntry, usize)> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let last = entries.len().checked_sub(1)?;
        let i = i.min(last);
        entries.get(last - i).map(|entry| (entry.clone(), i))
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// History persisted as JSON lines, one entry per line.
///
/// The whole file is loaded on open; new entries are appended and flushed
/// immediately. `capacity` bounds the entries kept in memory (0 keeps all);
/// the file itself keeps every line.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    file: Mutex<File>,
    memory: MemoryHistory,
}

impl FileHistory {
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        let memory = MemoryHistory::new(capacity);
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for (n, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<HistoryEntry>(&line) {
                    Ok(entry) => memory.insert(entry),
                    Err(e) => log::warn!("{}:{}: skipping bad entry: {e}", path.display(), n + 1),
                }
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::debug!(
            "opened history {} ({} entries)",
            path.display(),
            memory.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            memory,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistory {
    fn record(&self, command: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let entry = HistoryEntry {
            command: command.to_string(),
            timestamp,
        };
        let mut json = serde_json::to_string(&entry)?;
        json.push('\n');
        {
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            file.write_all(json.as_bytes())?;
            file.flush()?;
        }
        self.memory.insert(entry);
        Ok(())
    }

    fn nth_most_recent(&self, i: usize) -> Option<(HistoryEntry, usize)> {
        self.memory.nth_most_recent(i)
    }

    fn len(&self) -> usize {
        self.memory.len()
    }
}

/// Build the history store described by `config`.
pub fn open_history(config: &HistoryConfig) -> Result<Arc<dyn HistoryStore>> {
    match &config.path {
        Some(path) => Ok(Arc::new(FileHistory::open(path, config.capacity)?)),
        None => Ok(Arc::new(MemoryHistory::new(config.capacity))),
    }
}
