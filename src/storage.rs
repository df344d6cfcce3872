//! Storage substrate for taskboard
//!
//! A substrate is a plain key-value store of string blobs. Every collection
//! (projects, the task mapping, the session) lives under one key, and a
//! single-key write is atomic. Nothing spans multiple keys.
//!
//! # Directory Structure (file-backed)
//!
//! ```text
//! <data_dir>/
//!   taskboard.toml          # Optional configuration
//!   tm_user.json            # Session record
//!   tm_projects.json        # Project collection, newest-first
//!   tm_tasks.json           # Task mapping: project id -> tasks
//!   tm_tasks.json.lock      # Advisory lock held during read-modify-write
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Extension used for key files in a [`FileSubstrate`]
const KEY_EXTENSION: &str = "json";

/// Key-value port that the document codec reads and writes through.
pub trait Substrate: Send + Sync + fmt::Debug {
    /// Raw value stored under `key`, or `None` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Exclusive section for a read-modify-write of `key`, held until the
    /// returned guard is dropped. The default holds nothing.
    fn exclusive(&self, _key: &str) -> Result<ExclusiveGuard<'_>> {
        Ok(ExclusiveGuard::none())
    }
}

/// Anything whose drop ends an exclusive section.
trait Held {}

impl<T> Held for T {}

/// Opaque guard returned by [`Substrate::exclusive`].
#[must_use = "the exclusive section ends when the guard is dropped"]
pub struct ExclusiveGuard<'a> {
    held: Option<Box<dyn Held + 'a>>,
}

impl<'a> ExclusiveGuard<'a> {
    /// Keep `held` alive for as long as the guard; dropping the guard drops it.
    pub fn new<T: 'a>(held: T) -> Self {
        Self {
            held: Some(Box::new(held)),
        }
    }

    /// A guard that excludes nobody.
    pub fn none() -> Self {
        Self { held: None }
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }
}

impl fmt::Debug for ExclusiveGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveGuard")
            .field("held", &self.is_held())
            .finish()
    }
}

/// Shared handle used by repositories.
pub type SharedSubstrate = Arc<dyn Substrate>;

/// In-memory substrate for tests and throwaway sessions.
///
/// Exclusive sections are serialized by one writer mutex shared by all keys,
/// so threads sharing the substrate do not lose read-modify-write cycles.
#[derive(Debug, Default)]
pub struct MemorySubstrate {
    entries: Mutex<BTreeMap<String, String>>,
    writer: Mutex<()>,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to hand to a [`crate::board::Board`].
    pub fn shared() -> SharedSubstrate {
        Arc::new(Self::new())
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panic while holding the guard cannot leave a half-written value
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Substrate for MemorySubstrate {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn exclusive(&self, _key: &str) -> Result<ExclusiveGuard<'_>> {
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(ExclusiveGuard::new(writer))
    }
}

/// File-backed substrate: one JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileSubstrate {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl FileSubstrate {
    /// Create a substrate rooted at `root`. The directory is created lazily
    /// on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{KEY_EXTENSION}")))
    }

    /// Path of the lock file guarding `key`
    pub fn lock_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{KEY_EXTENSION}.lock")))
    }
}

impl Substrate for FileSubstrate {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        lock::write_atomic(&path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn exclusive(&self, key: &str) -> Result<ExclusiveGuard<'_>> {
        let path = self.lock_path(key)?;
        FileLock::acquire(&path, self.lock_timeout_ms).map(ExclusiveGuard::new)
    }
}

/// Keys become file names, so they must be a single plain path segment.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("invalid storage key: '{key}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_memory_get_set_remove() {
        let substrate = MemorySubstrate::new();
        assert_eq!(substrate.get("tm_projects").unwrap(), None);

        substrate.set("tm_projects", "[]").unwrap();
        assert_eq!(substrate.get("tm_projects").unwrap().as_deref(), Some("[]"));

        substrate.remove("tm_projects").unwrap();
        assert_eq!(substrate.get("tm_projects").unwrap(), None);

        // Removing twice is fine
        substrate.remove("tm_projects").unwrap();
        assert!(substrate.exclusive("tm_projects").unwrap().is_held());
    }

    #[test]
    fn test_memory_exclusive_serializes_threads() {
        let substrate = MemorySubstrate::new();
        substrate.set("counter", "0").unwrap();

        let threads = 8;
        let rounds = 50;
        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    for _ in 0..rounds {
                        let _guard = substrate.exclusive("counter").unwrap();
                        let current: u32 =
                            substrate.get("counter").unwrap().unwrap().parse().unwrap();
                        thread::yield_now();
                        substrate.set("counter", &(current + 1).to_string()).unwrap();
                    }
                });
            }
        });

        assert_eq!(
            substrate.get("counter").unwrap(),
            Some((threads * rounds).to_string())
        );
    }

    #[derive(Debug)]
    struct Unguarded;

    impl Substrate for Unguarded {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_exclusive_holds_nothing() {
        assert!(!Unguarded.exclusive("tm_tasks").unwrap().is_held());
    }

    #[test]
    fn test_file_paths() {
        let temp = TempDir::new().unwrap();
        let substrate = FileSubstrate::new(temp.path());

        assert_eq!(
            substrate.key_path("tm_tasks").unwrap(),
            temp.path().join("tm_tasks.json")
        );
        assert_eq!(
            substrate.lock_path("tm_tasks").unwrap(),
            temp.path().join("tm_tasks.json.lock")
        );
    }

    #[test]
    fn test_file_get_set_remove() {
        let temp = TempDir::new().unwrap();
        let substrate = FileSubstrate::new(temp.path().join("data"));

        // Missing directory reads as missing key
        assert_eq!(substrate.get("tm_user").unwrap(), None);

        substrate.set("tm_user", r#"{"username":"ada"}"#).unwrap();
        assert_eq!(
            substrate.get("tm_user").unwrap().as_deref(),
            Some(r#"{"username":"ada"}"#)
        );
        assert!(temp.path().join("data/tm_user.json").exists());

        substrate.remove("tm_user").unwrap();
        substrate.remove("tm_user").unwrap();
        assert_eq!(substrate.get("tm_user").unwrap(), None);
    }

    #[test]
    fn test_file_exclusive_blocks_second_holder() {
        let temp = TempDir::new().unwrap();
        let substrate = FileSubstrate::new(temp.path()).with_lock_timeout(50);

        let guard = substrate.exclusive("tm_tasks").unwrap();
        assert!(guard.is_held());

        let second = substrate.exclusive("tm_tasks");
        assert!(matches!(second, Err(Error::LockFailed(_))));

        drop(guard);
        assert!(substrate.exclusive("tm_tasks").unwrap().is_held());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let substrate = FileSubstrate::new(temp.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(
                matches!(substrate.set(key, "x"), Err(Error::InvalidArgument(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
