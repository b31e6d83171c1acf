//! Persisted key-value store.
//!
//! The store must survive a full page reload (a new process, for the CLI).
//! Only the pending handoff record lives here, under one fixed key.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use tempfile::NamedTempFile;

use crate::wallet::error::{WalletError, WalletResult};

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> WalletResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> WalletResult<()>;
    fn delete(&self, key: &str) -> WalletResult<()>;
}

/// In-memory store. Survives "reloads" only as long as the value itself is kept.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> WalletResult<Option<String>> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> WalletResult<()> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> WalletResult<()> {
        self.inner.remove(key);
        Ok(())
    }
}

/// JSON-file backed store with write-through on every mutation.
///
/// Every write goes to a temporary file in the same directory which is then
/// renamed over the store, so the file on disk is always either the old or
/// the new map. The in-memory map only changes once the write succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, loading existing entries if the file exists.
    ///
    /// An unreadable file is treated like an unreadable handoff record: its
    /// contents are dropped and the store starts empty.
    pub fn open(path: impl AsRef<Path>) -> WalletResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let file = File::open(&path)
                .map_err(|e| WalletError::Storage(format!("open {}: {}", path.display(), e)))?;
            match serde_json::from_reader::<_, BTreeMap<String, String>>(BufReader::new(file)) {
                Ok(map) => {
                    tracing::debug!(path = %path.display(), entries = map.len(), "Loaded persisted store");
                    map
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable store file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> WalletResult<()> {
        let write_err = |e: &dyn std::fmt::Display| {
            WalletError::Storage(format!("write {}: {}", self.path.display(), e))
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(&e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, entries).map_err(|e| write_err(&e))?;
            writer.flush().map_err(|e| write_err(&e))?;
        }
        tmp.as_file().sync_all().map_err(|e| write_err(&e))?;
        tmp.persist(&self.path).map_err(|e| write_err(&e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> WalletResult<Option<String>> {
        let entries = self.entries.lock().expect("file store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> WalletResult<()> {
        let mut entries = self.entries.lock().expect("file store mutex poisoned");
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn delete(&self, key: &str) -> WalletResult<()> {
        let mut entries = self.entries.lock().expect("file store mutex poisoned");
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}
