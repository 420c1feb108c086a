//! Directory tree flattening with joined fan-out
//!
//! [`TreeWalker`] turns a directory (shallow or recursive) into a flat list
//! of nodes, drops `.`/`..`, and applies per-node work to all of them
//! concurrently before joining the results.

use crate::error::{AdapterError, Result};
use crate::node::{Node, NodeKind};
use crate::path::is_dot_entry;
use crate::traits::metadata::AsyncMetadata;
use crate::traits::FsDriver;
use futures::future::{join_all, try_join_all};
use std::future::Future;
use std::path::Path;
use tracing::{debug, warn};

/// Tree walker over a driver
///
/// # Examples
///
/// ```rust,ignore
/// let walker = TreeWalker::new(&driver);
/// for node in walker.walk(Path::new("/srv/data"), true).await? {
///     println!("{} ({})", node.path.display(), node.kind);
/// }
/// ```
pub struct TreeWalker<'a, D: FsDriver> {
    driver: &'a D,
}

impl<'a, D: FsDriver> TreeWalker<'a, D> {
    /// Create a walker on top of `driver`
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// List the nodes under `dir`
    ///
    /// # Parameters
    ///
    /// * `dir` - Absolute directory location
    /// * `recursive` - Whether to descend into subdirectories (links are
    ///   never descended into)
    ///
    /// # Returns
    ///
    /// Returns every node except `.` and `..`, parents before children.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if a directory cannot be read.
    pub async fn walk(&self, dir: &Path, recursive: bool) -> Result<Vec<Node>> {
        let entries = if recursive {
            self.driver.list_recursive(dir).await?
        } else {
            self.driver.list(dir).await?
        };

        let nodes: Vec<Node> = entries
            .into_iter()
            .filter(|entry| !is_dot_entry(&entry.path))
            .map(|entry| Node::new(entry.path, entry.kind))
            .collect();

        debug!(
            "Walked {} ({}): {} nodes",
            dir.display(),
            if recursive { "recursive" } else { "shallow" },
            nodes.len()
        );
        Ok(nodes)
    }

    /// Apply `work` to every node concurrently and join the results
    ///
    /// The first failure rejects the whole batch.
    ///
    /// # Errors
    ///
    /// Returns the first `Err(AdapterError)` produced by `work`.
    pub async fn try_for_each<'n, T, F, Fut>(&self, nodes: &'n [Node], work: F) -> Result<Vec<T>>
    where
        F: Fn(&'n Node) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        try_join_all(nodes.iter().map(work)).await
    }

    /// Remove a directory tree
    ///
    /// Every non-directory descendant (files and links, which are unlinked
    /// rather than followed) is removed concurrently; once all removals have
    /// settled the remaining directory skeleton is removed in one call.
    ///
    /// # Returns
    ///
    /// Returns the number of non-directory nodes removed.
    ///
    /// A `dir` that is itself a symbolic link is refused and left in place;
    /// the tree behind it is never touched.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::NotSupported)` if `dir` is a link, and
    /// `Err(AdapterError)` if the tree cannot be listed, any removal fails,
    /// or the skeleton cannot be removed.
    pub async fn remove_tree(&self, dir: &Path) -> Result<usize> {
        if self.driver.link_stat(dir).await?.is_symlink() {
            return Err(AdapterError::NotSupported(format!(
                "Refusing to remove a directory tree through link at {}",
                dir.display()
            )));
        }

        let nodes = self.walk(dir, true).await?;
        let leaves: Vec<&Node> = nodes.iter().filter(|n| n.kind != NodeKind::Dir).collect();

        let results = join_all(leaves.iter().copied().map(|node| self.driver.remove(&node.path))).await;

        let failed: Vec<AdapterError> = results.into_iter().filter_map(|r| r.err()).collect();
        if let Some(first) = failed.into_iter().next() {
            warn!("Failed to empty {}: {}", dir.display(), first);
            return Err(first);
        }

        self.driver.remove_dir_all(dir).await?;
        debug!("Removed {} ({} leaves)", dir.display(), leaves.len());
        Ok(leaves.len())
    }
}
