//! Atomic TOML file operations.
//!
//! Writes go through a temporary sibling file and a rename, and
//! read-modify-write cycles hold an exclusive lock file.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vik_core::VikError;

#[derive(Debug, Error)]
pub enum AtomicTomlError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Lock error on {path}: {message}")]
    Lock { path: PathBuf, message: String },
    #[error("Update rejected: {0}")]
    Rejected(VikError),
}

impl From<AtomicTomlError> for VikError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Io { .. } | AtomicTomlError::Lock { .. } => VikError::io(err.to_string()),
            AtomicTomlError::Parse { source, .. } => source.into(),
            AtomicTomlError::Serialize(source) => source.into(),
            AtomicTomlError::Rejected(inner) => inner,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AtomicTomlError + '_ {
    move |source| AtomicTomlError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Handle to a TOML document on disk.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. Missing and blank files yield `None`.
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(io_error(&self.path))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| AtomicTomlError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes the document via tmp file, fsync and rename.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
        tmp_file
            .write_all(toml_string.as_bytes())
            .map_err(io_error(&tmp_path))?;
        tmp_file.sync_all().map_err(io_error(&tmp_path))?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(io_error(&self.path))
    }

    /// Loads (or starts from `default_value`), applies `f` and saves, all
    /// under the file lock. Nothing is written when `f` fails.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R, AtomicTomlError>
    where
        F: FnOnce(&mut T) -> Result<R, VikError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let result = f(&mut data).map_err(AtomicTomlError::Rejected)?;
        self.save(&data)?;

        Ok(result)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.toml".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }
}

/// Exclusive lock on `<file>.lock`, released on drop.
struct FileLock {
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_error(&lock_path))?;

        file.lock_exclusive().map_err(|e| AtomicTomlError::Lock {
            path: lock_path.clone(),
            message: e.to_string(),
        })?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    fn counter(count: u32) -> Counter {
        Counter {
            name: "counter".to_string(),
            count,
        }
    }

    #[test]
    fn test_load_missing_and_blank_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let file = AtomicTomlFile::<Counter>::new(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "   \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("nested/counter.toml"));

        file.update(counter(0), |c| {
            c.count += 10;
            Ok(())
        })
        .unwrap();
        let count = file
            .update(counter(0), |c| {
                c.count += 5;
                Ok(c.count)
            })
            .unwrap();

        assert_eq!(count, 15);
        assert_eq!(file.load().unwrap().unwrap(), counter(15));
        assert!(!temp_dir.path().join("nested/.counter.toml.tmp").exists());
        assert!(!temp_dir.path().join("nested/counter.lock").exists());
    }

    #[test]
    fn test_rejected_update_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.toml");
        let file = AtomicTomlFile::<Counter>::new(path.clone());
        file.save(&counter(1)).unwrap();

        let result = file.update(counter(0), |c| -> Result<(), VikError> {
            c.count = 99;
            Err(VikError::internal("nope"))
        });

        assert!(matches!(result, Err(AtomicTomlError::Rejected(_))));
        assert_eq!(file.load().unwrap().unwrap(), counter(1));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "name = ").unwrap();
        let err = AtomicTomlFile::<Counter>::new(path).load().unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
