//! Node kinds and race-based kind detection
//!
//! [`NodeResolver`] works out whether a path names a link, a directory, or
//! (by elimination) a file. It does not branch on a first stat: two probes
//! run at the same time and the first one to succeed decides.

use crate::error::{AdapterError, Result};
use crate::traits::{AsyncMetadata, FsDriver};
use futures::future::{select_ok, LocalBoxFuture};
use futures::FutureExt;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Kind of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Regular file (also used for paths that don't exist yet)
    File,
    /// Directory
    Dir,
    /// Symbolic link
    Link,
}

impl NodeKind {
    /// Classify a `std::fs::FileType` without following links
    #[must_use]
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Link
        } else if file_type.is_dir() {
            Self::Dir
        } else {
            Self::File
        }
    }

    /// Get the lowercase name used in normalized records
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An absolute path together with its resolved kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Absolute location
    pub path: PathBuf,
    /// Resolved kind
    pub kind: NodeKind,
}

impl Node {
    /// Create a new node
    #[must_use]
    pub const fn new(path: PathBuf, kind: NodeKind) -> Self {
        Self { path, kind }
    }
}

/// Race-based node kind detection
///
/// Both probes stat the path without following links, so at most one of
/// them can succeed and the answer does not depend on which finishes first.
pub struct NodeResolver<'a, D: FsDriver> {
    driver: &'a D,
}

impl<'a, D: FsDriver> NodeResolver<'a, D> {
    /// Create a resolver on top of `driver`
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Resolve the kind of `path`
    ///
    /// Never fails: a path that is neither a link nor a directory (including
    /// one that doesn't exist) resolves to [`NodeKind::File`].
    pub async fn resolve(&self, path: &Path) -> Node {
        let driver = self.driver;

        let link_probe: LocalBoxFuture<'_, Result<NodeKind>> = async move {
            let metadata = driver.link_stat(path).await?;
            if metadata.is_symlink() {
                Ok(NodeKind::Link)
            } else {
                Err(AdapterError::FileSystem(format!(
                    "{} is not a link",
                    path.display()
                )))
            }
        }
        .boxed_local();

        let dir_probe: LocalBoxFuture<'_, Result<NodeKind>> = async move {
            let metadata = driver.link_stat(path).await?;
            if metadata.is_dir() {
                Ok(NodeKind::Dir)
            } else {
                Err(AdapterError::FileSystem(format!(
                    "{} is not a directory",
                    path.display()
                )))
            }
        }
        .boxed_local();

        // The losing probe is dropped here together with its error
        let kind = match select_ok([link_probe, dir_probe]).await {
            Ok((kind, _remaining)) => kind,
            Err(e) => {
                debug!("Treating {} as a file: {}", path.display(), e);
                NodeKind::File
            }
        };

        Node::new(path.to_path_buf(), kind)
    }
}
