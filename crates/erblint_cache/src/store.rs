//! The on-disk result cache.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::key::{is_digest_name, is_temp_name};
use crate::{CacheEntry, CacheError, CacheKey};

/// Cache statistics for reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub writes: usize,
}

/// Outcome of [`ResultCache::prune`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneStats {
    /// Entry files looked at.
    pub examined: usize,
    /// Entry files deleted.
    pub removed: usize,
    /// Temp files left behind by interrupted writes and deleted.
    pub stale_temps: usize,
}

/// Distinguishes temp files of concurrent writes within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Default)]
struct Session {
    hits: HashSet<String>,
    written: HashSet<String>,
    stats: CacheStats,
}

/// A directory of cached results, one file per digest.
///
/// Safe to share between worker threads: different keys touch different
/// files, and the keys seen during the run are recorded behind a mutex.
#[derive(Debug)]
pub struct ResultCache {
    dir: PathBuf,
    session: Mutex<Session>,
}

impl ResultCache {
    /// Creates a cache rooted at `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            session: Mutex::new(Session::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, hex: &str) -> PathBuf {
        self.dir.join(hex)
    }

    /// Looks up a key. Absent, unreadable, corrupt or mismatched entries
    /// are misses.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = key.as_hex().and_then(|hex| self.read(hex));
        let mut session = self.session.lock();
        match (&entry, key.as_hex()) {
            (Some(_), Some(hex)) => {
                session.hits.insert(hex.to_string());
                session.stats.hits += 1;
            }
            _ => session.stats.misses += 1,
        }
        entry
    }

    fn read(&self, hex: &str) -> Option<CacheEntry> {
        let path = self.entry_path(hex);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache miss for {}", hex);
                return None;
            }
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match CacheEntry::from_bytes(&bytes) {
            Ok(entry) if entry.digest == hex => Some(entry),
            Ok(entry) => {
                warn!(
                    "Cache entry {} holds digest {}, ignoring",
                    path.display(),
                    entry.digest
                );
                None
            }
            Err(e) => {
                warn!("{} ({})", e, path.display());
                None
            }
        }
    }

    /// Stores an entry under `key`.
    ///
    /// The key is recorded as written before anything touches the disk, so a
    /// later [`ResultCache::prune`] keeps it even if the write fails midway.
    pub fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        let Some(hex) = key.as_hex() else {
            return Ok(());
        };
        {
            let mut session = self.session.lock();
            session.written.insert(hex.to_string());
            session.stats.writes += 1;
        }

        let bytes = entry.to_bytes()?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| CacheError::write(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.entry_path(hex);
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .dir
            .join(format!(".{hex}.{}.{seq}.tmp", std::process::id()));
        fs::write(&temp, &bytes)
            .and_then(|()| fs::rename(&temp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp);
                CacheError::write(format!("{}: {}", path.display(), e))
            })?;

        debug!("Cached {} offenses under {}", entry.offenses.len(), hex);
        Ok(())
    }

    /// Deletes every entry that was neither hit nor written in this run,
    /// along with temp files left by interrupted writes.
    ///
    /// Must only run once all writers are done. A missing directory is not
    /// an error.
    pub fn prune(&self) -> Result<PruneStats, CacheError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PruneStats::default()),
            Err(e) => return Err(CacheError::read(format!("{}: {}", self.dir.display(), e))),
        };

        let session = self.session.lock();
        let mut stats = PruneStats::default();
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_temp_name(name) {
                match fs::remove_file(dir_entry.path()) {
                    Ok(()) => stats.stale_temps += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                continue;
            }
            if !is_digest_name(name) {
                continue;
            }

            stats.examined += 1;
            if session.hits.contains(name) || session.written.contains(name) {
                continue;
            }
            match fs::remove_file(dir_entry.path()) {
                Ok(()) => stats.removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            "Pruned {} of {} cache entries and {} stale temp files in {}",
            stats.removed,
            stats.examined,
            stats.stale_temps,
            self.dir.display()
        );
        Ok(stats)
    }

    pub fn stats(&self) -> CacheStats {
        self.session.lock().stats
    }
}
