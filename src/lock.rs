//! Advisory file locks and atomic replacement for the file-backed store.
//!
//! A key's document `<key>.json` is guarded by a sibling `<key>.json.lock`.
//! The lock only coordinates `tb` processes (and threads holding separate
//! handles); readers that skip it still never see a torn document because
//! every write goes through [`write_atomic`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Distinguishes temp files written by threads of one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Exclusive hold on a lock file, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Wait up to `timeout_ms` for the lock at `path`, creating the file if
    /// needed. Still contended after the timeout gives `Error::LockFailed`.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut file = open_lock_file(path)?;

        loop {
            file = match Self::attempt(file, path)? {
                Ok(lock) => return Ok(lock),
                Err(file) => file,
            };
            if Instant::now() >= deadline {
                tracing::warn!(lock = %path.display(), timeout_ms, "lock wait timed out");
                return Err(Error::LockFailed(path.to_path_buf()));
            }
            thread::sleep(RETRY_INTERVAL);
        }
    }

    /// Take the lock only if it is free right now.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let file = open_lock_file(path)?;
        Ok(Self::attempt(file, path)?.ok())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One non-blocking try. Contention hands the file back for a retry.
    fn attempt(file: File, path: &Path) -> Result<std::result::Result<Self, File>> {
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Ok(FileLock {
                file,
                path: path.to_path_buf(),
            })),
            Err(err) if is_contended(&err) => Ok(Err(file)),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

fn is_contended(err: &io::Error) -> bool {
    // Windows reports sharing/lock violations as raw OS errors 32/33.
    err.kind() == io::ErrorKind::WouldBlock
        || (cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33)))
}

/// Replace `path` with `data` via a sibling temp file and a rename.
///
/// Readers see the old or the new document, never a mix. No lock is taken.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = dir.join(format!(
        ".{file_name}.tmp.{}.{}",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = File::create(&temp_path).and_then(|mut temp| {
        temp.write_all(data)?;
        temp.sync_all()
    });
    if let Err(err) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Io(err));
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
