// Fake Frog — Removable storage
//
// The medium abstraction, slot allocation for data and log file names, and
// the per-role open file.
//
// Names follow `<prefix><NNN><ext>` with `NNN` zero-padded to three digits.
// Each run claims the lowest free slot, so earlier runs' files are never
// reused or overwritten.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Highest slot count the 3-digit scheme can address.
pub const MAX_SLOTS: u16 = 1000;

/// A `Write` whose contents can be forced onto the medium.
pub trait SyncWrite: Write {
    /// Flush buffers and commit written data to the medium.
    fn sync(&mut self) -> io::Result<()>;
}

impl SyncWrite for File {
    fn sync(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_data()
    }
}

impl SyncWrite for Vec<u8> {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A mounted storage medium with a flat namespace.
pub trait StorageMedium {
    type File: SyncWrite;

    fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Create `name`, failing if it already exists.
    fn create(&mut self, name: &str) -> Result<Self::File, StorageError>;
}

/// A directory standing in for the card root: a host directory, or the
/// ESP-IDF FAT mount point.
#[derive(Debug, Clone)]
pub struct DirMedium {
    root: PathBuf,
}

impl DirMedium {
    /// Attach to an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StorageError::Unavailable {
                path: root.display().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StorageMedium for DirMedium {
    type File = File;

    fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.root.join(name).try_exists()?)
    }

    fn create(&mut self, name: &str) -> Result<File, StorageError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(name))?;
        Ok(file)
    }
}

/// Formats `<prefix><index:03><extension>`.
pub fn slot_name(prefix: &str, index: u16, extension: &str) -> String {
    format!("{prefix}{index:03}{extension}")
}

/// First name in `0..max_index` that does not exist on `medium`.
///
/// Does not create anything; repeated calls return the same name until it is
/// created. `max_index` is capped at [`MAX_SLOTS`].
pub fn allocate<M: StorageMedium + ?Sized>(
    medium: &M,
    prefix: &str,
    extension: &str,
    max_index: u16,
) -> Result<String, StorageError> {
    for index in 0..max_index.min(MAX_SLOTS) {
        let candidate = slot_name(prefix, index, extension);
        if !medium.exists(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(StorageError::Exhausted {
        prefix: prefix.to_owned(),
        extension: extension.to_owned(),
        max_index,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Data,
    Log,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRole::Data => f.write_str("data"),
            FileRole::Log => f.write_str("log"),
        }
    }
}

/// An open file on the medium, created once per run.
pub struct StorageFile<W> {
    role: FileRole,
    name: String,
    handle: W,
}

impl<W: SyncWrite> StorageFile<W> {
    pub fn new(role: FileRole, name: impl Into<String>, handle: W) -> Self {
        Self {
            role,
            name: name.into(),
            handle,
        }
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &W {
        &self.handle
    }

    /// Append `bytes` and commit them before returning.
    pub fn append_durable(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.handle.write_all(bytes)?;
        self.handle.sync()
    }
}

/// Allocate the next free slot for `role` and create it.
pub fn open_storage_file<M: StorageMedium + ?Sized>(
    medium: &mut M,
    role: FileRole,
    prefix: &str,
    extension: &str,
    max_index: u16,
) -> Result<StorageFile<M::File>, StorageError> {
    let name = allocate(medium, prefix, extension, max_index)?;
    let handle = medium.create(&name)?;
    log::debug!("Opened {} file {}", role, name);
    Ok(StorageFile::new(role, name, handle))
}
