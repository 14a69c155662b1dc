//! Filesystem-backed object store.
//!
//! Each bucket is a directory under the store root and each key is a file
//! path relative to its bucket (`/` in a key creates subdirectories).
//!
//! # Writes
//!
//! `put` follows the same pattern for every object:
//! 1. Write the bytes to a temporary file next to the target
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! Readers therefore never observe a partially written lock record. The rename
//! replaces any existing object, so `put` keeps plain overwrite semantics.
//! Temporary files are named `.{filename}.{pid}-{n}.tmp` and may be left
//! behind by a crash.
//!
//! # Names
//!
//! Keys are split on `/`. Every segment must be non-empty and must not be
//! `.` or `..` or contain `\`. Segments that look like a temporary file
//! (leading `.` and trailing `.tmp`) are reserved. Other dot-names such as
//! `.env.lock` are ordinary objects.

use super::{ObjectStore, StoreError};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// An object store rooted at a local (or shared network) directory.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the file path of an object, rejecting names that would escape
    /// the bucket directory.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_name("bucket", bucket)?;
        if bucket.contains('/') {
            return Err(StoreError::Other(format!(
                "invalid bucket '{}': must not contain '/'",
                bucket
            )));
        }
        validate_name("key", key)?;

        Ok(self.root.join(bucket).join(key))
    }
}

fn validate_name(kind: &str, name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::Other(format!("invalid {}: empty", kind)));
    }

    for segment in name.split('/') {
        let reason = if segment.is_empty() {
            Some("empty path segment")
        } else if segment == "." || segment == ".." {
            Some("relative path segment")
        } else if segment.contains('\\') {
            Some("backslash in path segment")
        } else if is_temp_name(segment) {
            Some("reserved temporary file name")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(StoreError::Other(format!(
                "invalid {} '{}': {}",
                kind, name, reason
            )));
        }
    }

    // Catches prefixes such as `C:` that `split` cannot see
    if !Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(StoreError::Other(format!(
            "invalid {} '{}': not a relative path",
            kind, name
        )));
    }

    Ok(())
}

fn is_temp_name(segment: &str) -> bool {
    segment.starts_with('.') && segment.ends_with(".tmp")
}

impl ObjectStore for FilesystemStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::not_found(bucket, key)
            } else {
                StoreError::Io(e)
            }
        })
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        atomic_write(&path, value)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Write `content` to a temporary sibling of `path`, sync it, then rename it
/// over `path`.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StoreError::Io(e)
    })?;

    // Persist the directory entry as well (best effort; fails on Windows)
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn generate_temp_path(target: &Path) -> Result<PathBuf, StoreError> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::Other(format!("invalid object path '{}'", target.display())))?;

    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}-{}.tmp", filename, std::process::id(), n);
    Ok(parent.join(temp_name))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut file = File::create(path)?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(StoreError::Io(e));
    }

    Ok(())
}
