//! Shell navigation and selection context
//!
//! The current directory, its back/forward history, the cached listing of
//! its entries and the set of selected paths. Built-ins and the session
//! manager receive this value explicitly instead of reading process-global
//! state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::{DirEntry, FilesystemOps};

/// Browser-style back/forward directory stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    stack: Vec<PathBuf>,
    position: usize,
}

impl Navigation {
    /// Start at `directory` with no history
    pub fn new(directory: PathBuf) -> Self {
        Self {
            stack: vec![directory],
            position: 0,
        }
    }

    /// The current directory
    pub fn current(&self) -> &Path {
        &self.stack[self.position]
    }

    /// Navigate to `directory`, discarding any forward history
    pub fn open(&mut self, directory: PathBuf) {
        self.stack.truncate(self.position + 1);
        self.stack.push(directory);
        self.position += 1;
    }

    pub fn can_go_back(&self) -> bool {
        self.position > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.position + 1 < self.stack.len()
    }

    /// Step back; returns false if there is no back history
    pub fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.position -= 1;
        true
    }

    /// Step forward; returns false if there is no forward history
    pub fn go_forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.position += 1;
        true
    }
}

/// Directory and selection state shared by built-ins and sessions
pub struct ShellContext {
    navigation: Navigation,
    selection: BTreeSet<PathBuf>,
    entries: Vec<DirEntry>,
    filesystem: Arc<dyn FilesystemOps>,
}

impl ShellContext {
    /// Create a context rooted at `directory` and list it
    pub fn new(directory: PathBuf, filesystem: Arc<dyn FilesystemOps>) -> Self {
        let mut context = Self {
            navigation: Navigation::new(directory),
            selection: BTreeSet::new(),
            entries: Vec::new(),
            filesystem,
        };
        context.refresh();
        context
    }

    /// The current directory
    pub fn current_directory(&self) -> &Path {
        self.navigation.current()
    }

    /// Back/forward history
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// The filesystem collaborator
    pub fn filesystem(&self) -> &dyn FilesystemOps {
        self.filesystem.as_ref()
    }

    /// Cached entries of the current directory, sorted by path
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Selected paths, in path order
    pub fn selection(&self) -> &BTreeSet<PathBuf> {
        &self.selection
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selection.contains(path)
    }

    /// Add a path to the selection; returns false if it was already selected
    pub fn select(&mut self, path: PathBuf) -> bool {
        self.selection.insert(path)
    }

    /// Remove a path from the selection; returns false if it was not selected
    pub fn deselect(&mut self, path: &Path) -> bool {
        self.selection.remove(path)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Navigate to `directory` and re-list it
    pub fn open(&mut self, directory: PathBuf) {
        debug!("Navigating to {}", directory.display());
        self.navigation.open(directory);
        self.refresh();
    }

    /// Step back in the navigation history
    pub fn go_back(&mut self) -> bool {
        let moved = self.navigation.go_back();
        if moved {
            self.refresh();
        }
        moved
    }

    /// Step forward in the navigation history
    pub fn go_forward(&mut self) -> bool {
        let moved = self.navigation.go_forward();
        if moved {
            self.refresh();
        }
        moved
    }

    /// Re-list the current directory.
    ///
    /// Called after navigation and whenever the owner learns the directory
    /// changed on disk. A failed listing leaves the cache empty.
    pub fn refresh(&mut self) {
        let directory = self.navigation.current();
        self.entries = match self.filesystem.list_directory(directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        };
    }

    /// Append every selected path to `command`, escaping spaces
    pub fn paste_selection(&self, command: &str) -> String {
        let mut line = command.trim().to_string();
        for path in &self.selection {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&path.to_string_lossy().replace(' ', "\\ "));
        }
        line
    }
}
