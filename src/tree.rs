//! Read-only access to a hierarchical file tree of containers and files.

use std::path::Path;

use crate::error::Error;
use crate::types::{ChildEntry, FileHandle, TreePath};

/// The three read operations the resolver relies on, plus location mapping.
/// Implementations own the tree; callers only read it for the length of one call.
pub trait TreeProvider {
    /// Whether a file exists at `path`, reachable through accessible containers only.
    fn exists_at(&self, path: &TreePath) -> bool;

    /// Handle for the file at `path`. Does not check existence.
    fn file_at(&self, path: &TreePath) -> FileHandle;

    /// Every tree path that shares the storage location of `file`, `file` included.
    fn files_for_location(&self, file: &FileHandle) -> Vec<FileHandle> {
        return vec![file.clone()];
    }

    /// Map a storage location back to a file handle, if it lies inside the tree.
    fn handle_for_location(&self, _location: &Path) -> Option<FileHandle> {
        return None;
    }

    /// List the direct children of a container.
    ///
    /// # Errors
    ///
    /// Returns `Error::TreeUnavailable` if the container cannot be listed.
    fn list_children(&self, container: &TreePath) -> Result<Vec<ChildEntry>, Error>;
}
