// ABOUTME: Archive saving for the banana-slides client
// ABOUTME: Offers a downloaded archive to the user as a file on disk

use crate::errors::Result;
use crate::utils;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// A packaged slideshow as received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    filename: String,
    bytes: Vec<u8>,
}

impl Archive {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Destination for downloaded archives
pub trait ArchiveSink: Send + Sync {
    /// Save the archive and return where it ended up
    fn offer(&self, archive: &Archive) -> Result<PathBuf>;
}

/// Saves archives into a directory
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArchiveSink for DirectorySink {
    fn offer(&self, archive: &Archive) -> Result<PathBuf> {
        utils::ensure_directory_exists(&self.dir)?;

        let target = self.dir.join(archive.filename());
        let partial = self.dir.join(format!("{}.part", archive.filename()));

        // Write under a temporary name so the final name only ever holds a full archive
        if let Err(e) = fs::write(&partial, archive.bytes()) {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!("Failed to clean up {:?}: {}", partial, cleanup);
            }
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&partial, &target) {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!("Failed to clean up {:?}: {}", partial, cleanup);
            }
            return Err(e.into());
        }

        info!("Saved {} bytes to {:?}", archive.len(), target);
        Ok(target)
    }
}
