//! Durable key/value storage on the local machine.
//!
//! Values are strings (JSON documents in practice). Writes may fail under quota pressure; callers
//! treat that as non-fatal.
//!
//! ```text
//! <root>/
//!   <urlencoded key>.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Process-wide durable store shared through `Arc<dyn LocalStore>`.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> FramemarkResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> FramemarkResult<()>;
    /// Removing a missing key succeeds.
    fn remove(&self, key: &str) -> FramemarkResult<()>;
}

/// Read and deserialize a JSON value; `None` when the key is absent.
pub fn read_json<T: serde::de::DeserializeOwned>(
    store: &dyn LocalStore,
    key: &str,
) -> FramemarkResult<Option<T>> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw).map_err(FramemarkError::from))
        .transpose()
}

pub fn write_json<T: serde::Serialize>(
    store: &dyn LocalStore,
    key: &str,
    value: &T,
) -> FramemarkResult<()> {
    store.set(key, &serde_json::to_string(value)?)
}

/// One file per key under a root directory, with an optional byte quota over all values.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> FramemarkResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create store directory {}", root.display()))?;
        Ok(Self {
            root,
            quota_bytes: None,
        })
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }

    fn used_bytes_excluding(&self, skip: &Path) -> io::Result<u64> {
        let mut total = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path != skip && path.extension().is_some_and(|e| e == "json") {
                total += entry.metadata()?.len();
            }
        }
        Ok(total)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> FramemarkResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FramemarkError::local(format!("read {key}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> FramemarkResult<()> {
        let path = self.path_for(key);
        if let Some(quota) = self.quota_bytes {
            let used = self
                .used_bytes_excluding(&path)
                .map_err(|e| FramemarkError::local(format!("measure store usage: {e}")))?;
            if used + value.len() as u64 > quota {
                return Err(FramemarkError::local(format!(
                    "quota exceeded writing {key} ({} bytes, {used}/{quota} used)",
                    value.len()
                )));
            }
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| FramemarkError::local(format!("write {key}: {e}")))
    }

    fn remove(&self, key: &str) -> FramemarkResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FramemarkError::local(format!("remove {key}: {e}"))),
        }
    }
}

/// In-memory store for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
    fail_removes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Make every subsequent `remove` fail, as a store refusing deletes would.
    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::Relaxed);
    }

    /// Snapshot of all keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> FramemarkResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| FramemarkError::local("memory store lock poisoned"))
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> FramemarkResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> FramemarkResult<()> {
        let mut entries = self.lock()?;
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if (used + value.len()) as u64 > quota {
                return Err(FramemarkError::local(format!("quota exceeded writing {key}")));
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> FramemarkResult<()> {
        if self.fail_removes.load(Ordering::Relaxed) {
            return Err(FramemarkError::local(format!("remove {key} refused")));
        }
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/local.rs"]
mod tests;
