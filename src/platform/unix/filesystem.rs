//! Unix filesystem operations

use crate::error::{Error, Result};
use crate::platform::traits::{DirEntry, FilesystemOps};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct UnixFilesystem;

impl UnixFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl FilesystemOps for UnixFilesystem {
    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let read_dir = std::fs::read_dir(path).map_err(|e| Error::DirectoryListFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            // Follow symlinks so a link to a directory counts as one
            let entry_path = entry.path();
            let is_dir = entry_path.is_dir();
            entries.push(DirEntry {
                path: entry_path,
                name,
                is_dir,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}
