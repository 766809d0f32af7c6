use crate::cache::CacheError;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const TEMP_SUFFIX: &str = ".tmp";

/// Deletes `path`, treating a file that is already gone as success. Returns
/// whether this call removed it.
fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

struct DiskEntry {
    path: PathBuf,
    size: u64,
    accessed: SystemTime,
}

/// Directory of cached blobs, one file per key.
///
/// A file's modification time doubles as its last access time: reads touch
/// it, and anything untouched for longer than `expiration` is treated as gone.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    dir: PathBuf,
    size_limit: u64,
    expiration: Duration,
}

impl DiskStorage {
    pub fn new(dir: impl Into<PathBuf>, size_limit: u64, expiration: Duration) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            size_limit,
            expiration,
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{:x}", Sha256::digest(key.as_bytes())))
    }

    fn is_expired(&self, accessed: SystemTime, now: SystemTime) -> bool {
        now.duration_since(accessed)
            .map(|age| age > self.expiration)
            .unwrap_or(false)
    }

    pub fn store(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let temp_path = path.with_extension(format!(
            "{}{TEMP_SUFFIX}",
            rusty_ulid::generate_ulid_string()
        ));

        if let Err(err) = fs::write(&temp_path, data).and_then(|_| fs::rename(&temp_path, &path)) {
            let _ = remove_if_exists(&temp_path);
            return Err(err.into());
        }

        if self.total_size() > self.size_limit {
            self.trim()?;
        }
        Ok(())
    }

    /// Reads the blob for `key` if it exists and has not expired.
    pub fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        if self.is_expired(meta.modified()?, now) {
            log::debug!("{}: expired on disk", path.display());
            remove_if_exists(&path)?;
            return Ok(None);
        }

        let data = fs::read(&path)?;
        File::options().write(true).open(&path)?.set_modified(now)?;
        Ok(Some(data))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    fn entries(&self) -> Vec<DiskEntry> {
        fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter_map(|entry| {
                        let path = entry.path();
                        let name = path.file_name()?.to_str()?;
                        if name.ends_with(TEMP_SUFFIX) {
                            return None;
                        }
                        let meta = entry.metadata().ok()?;
                        if !meta.is_file() {
                            return None;
                        }
                        Some(DiskEntry {
                            size: meta.len(),
                            accessed: meta.modified().ok()?,
                            path,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn total_size(&self) -> u64 {
        self.entries().iter().map(|e| e.size).sum()
    }

    /// Deletes least recently accessed files until the cache is at most half
    /// of its size limit.
    fn trim(&self) -> Result<(), CacheError> {
        let mut entries = self.entries();
        let mut total: u64 = entries.iter().map(|e| e.size).sum();
        let target = self.size_limit / 2;

        entries.sort_by_key(|e| e.accessed);
        for entry in entries {
            if total <= target {
                break;
            }
            // another store may have trimmed it first
            remove_if_exists(&entry.path)?;
            total -= entry.size;
        }

        log::debug!("disk cache trimmed to {total} bytes");
        Ok(())
    }

    /// Deletes expired files. Returns how many were removed.
    pub fn remove_expired(&self) -> Result<usize, CacheError> {
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in self.entries() {
            if self.is_expired(entry.accessed, now) && remove_if_exists(&entry.path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        for entry in self.entries() {
            remove_if_exists(&entry.path)?;
        }
        Ok(())
    }
}
