use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{path} changed on disk since it was read")]
    ConcurrentModification { path: PathBuf },

    #[error("Path has no parent directory: {0}")]
    NoParent(PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of writing an edited document back to its file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "WriteResult reports whether the file was touched"]
pub enum WriteResult {
    Written { path: PathBuf, bytes: usize },
    /// The new content equals what is on disk; nothing was written.
    Unchanged { path: PathBuf },
}

/// An input file read into memory, remembered by an xxh3 fingerprint so a
/// later write-back can detect that someone else changed it meanwhile.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
    fingerprint: u64,
}

impl SourceFile {
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let fingerprint = xxh3_64(content.as_bytes());
        Ok(Self {
            path,
            content,
            fingerprint,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the file with `new_content`, atomically.
    ///
    /// Fails with [`SourceError::ConcurrentModification`] when the file no
    /// longer matches what [`SourceFile::read`] saw.
    pub fn write_back(&self, new_content: &str) -> Result<WriteResult, SourceError> {
        let current = fs::read(&self.path)?;
        if xxh3_64(&current) != self.fingerprint {
            return Err(SourceError::ConcurrentModification {
                path: self.path.clone(),
            });
        }

        if current == new_content.as_bytes() {
            return Ok(WriteResult::Unchanged {
                path: self.path.clone(),
            });
        }

        atomic_write(&self.path, new_content.as_bytes())?;

        Ok(WriteResult::Written {
            path: self.path.clone(),
            bytes: new_content.len(),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SourceError> {
    // Same directory as the target so the rename stays on one filesystem.
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(SourceError::NoParent(path.to_path_buf())),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
