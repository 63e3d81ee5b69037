use std::ops::ControlFlow;

use crate::error::Error;
use crate::tree::TreeProvider;
use crate::types::{ChildEntry, FileHandle, TreePath};

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// Every accessible container was visited.
    Completed,
    /// The visited-node cap was hit before the tree was exhausted.
    LimitReached,
    /// The visitor asked to stop.
    Stopped,
}

/// Collect every file under `root`, optionally only those named exactly `name`.
/// Closed or unreadable sub-containers are skipped. Order is depth-first in the
/// sibling order the tree exposes.
///
/// # Errors
///
/// Returns `Error::TreeUnavailable` if `root` itself cannot be listed.
pub fn find_files<T: TreeProvider + ?Sized>(
    tree: &T,
    root: &TreePath,
    name: Option<&str>,
) -> Result<Vec<FileHandle>, Error> {
    let mut files = Vec::new();
    visit_files(tree, root, name, None, |file| {
        files.push(file);
        return ControlFlow::Continue(());
    })?;
    return Ok(files);
}

/// Depth-first walk handing each matching file to `visitor`, which may break early.
/// `limit` caps the number of visited nodes (files and containers alike).
///
/// # Errors
///
/// Returns `Error::TreeUnavailable` if `root` itself cannot be listed.
pub fn visit_files<T, F>(
    tree: &T,
    root: &TreePath,
    name: Option<&str>,
    limit: Option<usize>,
    visitor: F,
) -> Result<ScanEnd, Error>
where
    T: TreeProvider + ?Sized,
    F: FnMut(FileHandle) -> ControlFlow<()>,
{
    let children = tree.list_children(root)?;
    let mut walk = Walk { limit, name, tree, visited: 0, visitor };
    let end = match walk.children(root, children) {
        ControlFlow::Break(end) => end,
        ControlFlow::Continue(()) => ScanEnd::Completed,
    };

    if end == ScanEnd::LimitReached {
        tracing::warn!(visited = walk.visited, root = %root, "scan stopped at visited-node cap");
    }
    tracing::debug!(visited = walk.visited, ?end, "scan finished");
    return Ok(end);
}

/// Mutable state threaded through one walk.
struct Walk<'a, T: ?Sized, F> {
    /// Visited-node cap.
    limit: Option<usize>,
    /// Exact file name filter.
    name: Option<&'a str>,
    /// Tree being walked.
    tree: &'a T,
    /// Nodes seen so far.
    visited: usize,
    /// Receives matching files.
    visitor: F,
}

impl<T, F> Walk<'_, T, F>
where
    T: TreeProvider + ?Sized,
    F: FnMut(FileHandle) -> ControlFlow<()>,
{
    /// Visit already-listed children of `parent` in order.
    fn children(&mut self, parent: &TreePath, children: Vec<ChildEntry>) -> ControlFlow<ScanEnd> {
        for child in children {
            self.visited = self.visited.saturating_add(1);
            if self.limit.is_some_and(|limit| return self.visited > limit) {
                return ControlFlow::Break(ScanEnd::LimitReached);
            }

            let path = parent.join(&child.name);
            if child.is_container {
                self.container(&path, child.is_accessible)?;
                continue;
            }

            if self.name.is_some_and(|name| return name != child.name) {
                continue;
            }
            let file = self.tree.file_at(&path);
            if (self.visitor)(file).is_break() {
                return ControlFlow::Break(ScanEnd::Stopped);
            }
        }
        return ControlFlow::Continue(());
    }

    /// Descend into a container unless it is closed or cannot be listed.
    fn container(&mut self, path: &TreePath, is_accessible: bool) -> ControlFlow<ScanEnd> {
        if !is_accessible {
            tracing::debug!(container = %path, "skipping closed container");
            return ControlFlow::Continue(());
        }
        match self.tree.list_children(path) {
            Ok(children) => return self.children(path, children),
            Err(e) => {
                tracing::warn!(container = %path, error = %e, "skipping unreadable container");
                return ControlFlow::Continue(());
            },
        }
    }
}
