//! FsDriver trait for primitive filesystem calls
//!
//! The driver is the lowest layer of the adapter: every method is a single,
//! policy-free filesystem primitive. Sequencing, soft-failure handling and
//! visibility translation all happen above it in [`crate::adapter`].

use crate::config::WriteMode;
use crate::error::Result;
use crate::node::NodeKind;
use crate::stream::{ByteSink, ByteSource};
use std::path::{Path, PathBuf};

use super::AsyncMetadata;

/// One node found while listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverEntry {
    /// Absolute path of the node
    pub path: PathBuf,
    /// Kind of the node itself (links are not followed)
    pub kind: NodeKind,
}

impl DriverEntry {
    /// Create a new entry
    #[must_use]
    pub const fn new(path: PathBuf, kind: NodeKind) -> Self {
        Self { path, kind }
    }
}

/// Primitive async filesystem driver
///
/// # Type Parameters
///
/// * `Metadata` - Stat result type
/// * `Reader` - Stream returned when opening a file for reading
/// * `Writer` - Stream returned when opening a file for writing
///
/// # Examples
///
/// ```rust,ignore
/// let driver = LocalDriver::new();
/// driver.create_dir_all(Path::new("/srv/data/a/b"), 0o755).await?;
/// for entry in driver.list(Path::new("/srv/data")).await? {
///     println!("{} ({})", entry.path.display(), entry.kind);
/// }
/// ```
pub trait FsDriver: Clone + 'static {
    /// The metadata type for this driver
    type Metadata: AsyncMetadata;

    /// The readable stream type for this driver
    type Reader: ByteSource;

    /// The writable stream type for this driver
    type Writer: ByteSink;

    /// Get metadata for a path, following links
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the path doesn't exist or cannot be stat'ed.
    async fn stat(&self, path: &Path) -> Result<Self::Metadata>;

    /// Get metadata for a path without following a final link
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the path doesn't exist or cannot be stat'ed.
    async fn link_stat(&self, path: &Path) -> Result<Self::Metadata>;

    /// Check if a node exists at `path` (a dangling link counts)
    async fn exists(&self, path: &Path) -> bool {
        self.link_stat(path).await.is_ok()
    }

    /// Get the size of a file
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the file cannot be stat'ed.
    async fn size(&self, path: &Path) -> Result<u64> {
        Ok(self.stat(path).await?.size())
    }

    /// Open an existing file for streaming reads
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the file doesn't exist or can't be opened.
    async fn open_read(&self, path: &Path) -> Result<Self::Reader>;

    /// Open a file for writing, creating it if needed
    ///
    /// `WriteMode::Truncate` empties an existing file; `WriteMode::Append`
    /// positions writes after its current end.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the parent directory is missing or the
    /// file cannot be opened.
    async fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Self::Writer>;

    /// Open an existing file for writing without creating it
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the file doesn't exist or can't be opened.
    async fn open_existing(&self, path: &Path, mode: WriteMode) -> Result<Self::Writer>;

    /// Read the whole file in one call
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the file cannot be opened or read.
    async fn read_contents(&self, path: &Path) -> Result<Vec<u8>>;

    /// Rename a node
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the source is missing or the rename is rejected.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Copy file bytes (permissions are not carried over)
    ///
    /// # Returns
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the source can't be read or the destination written.
    async fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Remove a single non-directory node (a link is removed, not its target)
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the node is missing or is a directory.
    async fn remove(&self, path: &Path) -> Result<()>;

    /// Change permission bits
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the path is missing or the change is rejected.
    async fn chmod(&self, path: &Path, bits: u32) -> Result<()>;

    /// List the direct children of a directory
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the directory cannot be read.
    async fn list(&self, dir: &Path) -> Result<Vec<DriverEntry>>;

    /// List every descendant of a directory, parents before children
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if any directory in the tree cannot be read.
    async fn list_recursive(&self, dir: &Path) -> Result<Vec<DriverEntry>>;

    /// Create a directory and all missing parents with the given bits
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if a component cannot be created.
    async fn create_dir_all(&self, dir: &Path, bits: u32) -> Result<()>;

    /// Remove a directory tree
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the tree cannot be removed.
    async fn remove_dir_all(&self, dir: &Path) -> Result<()>;

    /// Make sure a directory exists, creating it recursively if absent
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the directory is absent and cannot be created.
    async fn ensure_directory(&self, dir: &Path, bits: u32) -> Result<()> {
        match self.stat(dir).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            _ => self.create_dir_all(dir, bits).await,
        }
    }

    /// Check whether the current process may read `path`
    async fn is_readable(&self, path: &Path) -> bool;

    /// Resolve a path to its real location
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if a component is missing.
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Get the driver name for debugging/logging
    fn name(&self) -> &'static str {
        "unknown"
    }
}
