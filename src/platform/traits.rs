//! Platform-specific operation traits
//!
//! These traits define the interface for platform-specific operations,
//! allowing for clean abstraction and easier testing.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Platform-specific signal operations
#[async_trait::async_trait]
pub trait SignalOps: Send + Sync {
    /// Send a termination signal to the process group led by `pid`,
    /// falling back to the process itself
    async fn terminate_group(&self, pid: u32) -> Result<()>;
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    /// Full path of the entry
    pub path: PathBuf,
    /// File name component
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Platform-specific filesystem operations
pub trait FilesystemOps: Send + Sync {
    /// List the visible entries of a directory, sorted by path
    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Check that a path exists and is a directory
    fn is_directory(&self, path: &Path) -> bool;

    /// The user's home directory
    fn home_dir(&self) -> Option<PathBuf>;
}
