//! FilesystemOperations trait and the records it returns
//!
//! This trait is the capability contract a facade talks to: one async method
//! per verb, each returning either a normalized record or a soft-failure value
//! (`false` / `None`). Hard failures (initialization, disallowed links,
//! unreadable stream sources) come back as `Err`.

use crate::config::WriteOptions;
use crate::error::Result;
use crate::metadata::NormalizedMetadata;
use crate::node::NodeKind;
use crate::stream::ByteSource;

/// Result of a successful write, update or stream write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Always [`NodeKind::File`]
    pub kind: NodeKind,
    /// Relative path of the written file
    pub path: String,
    /// Size after the write
    pub size: Option<u64>,
    /// Bytes written, for in-memory writes
    pub contents: Option<Vec<u8>>,
    /// Extension-based MIME type, for updates
    pub mimetype: Option<String>,
    /// Label applied after the write, if one was requested
    pub visibility: Option<String>,
}

impl WriteOutcome {
    /// Create an outcome carrying only the path
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::File,
            path: path.into(),
            size: None,
            contents: None,
            mimetype: None,
            visibility: None,
        }
    }
}

/// Whole-file read result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    /// Always [`NodeKind::File`]
    pub kind: NodeKind,
    /// Relative path of the file
    pub path: String,
    /// File bytes
    pub contents: Vec<u8>,
}

/// Open read stream for a file
pub struct FileStream<R> {
    /// Always [`NodeKind::File`]
    pub kind: NodeKind,
    /// Relative path of the file
    pub path: String,
    /// Stream positioned at the start of the file
    pub stream: R,
}

/// Directory creation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCreated {
    /// Always [`NodeKind::Dir`]
    pub kind: NodeKind,
    /// Relative path of the directory
    pub path: String,
}

/// Visibility label of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityInfo {
    /// Relative path of the node
    pub path: String,
    /// Configured label, or four octal digits when no label matches
    pub visibility: String,
}

/// MIME type guessed from a path's extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeInfo {
    /// Always [`NodeKind::File`]
    pub kind: NodeKind,
    /// Path as given
    pub path: String,
    /// MIME type (`application/octet-stream` when unmapped)
    pub mimetype: String,
}

/// Filesystem operations on paths relative to an adapter root
///
/// Every method except [`get_mimetype`](Self::get_mimetype) first waits for
/// the adapter to become ready and fails with
/// `AdapterError::Initialization` if it never does.
///
/// # Examples
///
/// ```rust,ignore
/// let adapter = LocalAdapter::local(AdapterConfig::new("/srv/storage")).await?;
///
/// adapter.write("docs/a.txt", b"hello", &WriteOptions::with_visibility("private")).await?;
/// if let Some(file) = adapter.read("docs/a.txt").await? {
///     assert_eq!(file.contents, b"hello");
/// }
/// for entry in adapter.list_contents("docs", true).await? {
///     println!("{} {}", entry.kind, entry.path);
/// }
/// ```
pub trait FilesystemOperations {
    /// Stream type handed out by [`read_stream`](Self::read_stream)
    type Stream: ByteSource;

    /// Write a file, creating missing parent directories
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the parent can't be created, the file
    /// can't be written, or the requested visibility can't be applied.
    async fn write(&self, path: &str, contents: &[u8], options: &WriteOptions)
        -> Result<WriteOutcome>;

    /// Write a file from a stream, creating missing parent directories
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::NotReadable)` before touching the disk if
    /// `source` is not readable, or `Err(AdapterError)` if piping fails.
    async fn write_stream<S: ByteSource>(
        &self,
        path: &str,
        source: S,
        options: &WriteOptions,
    ) -> Result<WriteOutcome>;

    /// Replace a file from a stream (same procedure as `write_stream`)
    ///
    /// # Errors
    ///
    /// Same as [`write_stream`](Self::write_stream).
    async fn update_stream<S: ByteSource>(
        &self,
        path: &str,
        source: S,
        options: &WriteOptions,
    ) -> Result<WriteOutcome>;

    /// Rewrite an existing file
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the file doesn't exist or can't be written.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn update(
        &self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> Result<Option<WriteOutcome>>;

    /// Open a file for streaming reads
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the file can't be opened.
    async fn read_stream(&self, path: &str) -> Result<FileStream<Self::Stream>>;

    /// Read a whole file
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the file can't be read.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn read(&self, path: &str) -> Result<Option<FileContents>>;

    /// Rename a node, creating the destination's parent directories
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn rename(&self, path: &str, newpath: &str) -> Result<bool>;

    /// Copy file bytes, creating the destination's parent directories
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn copy(&self, path: &str, newpath: &str) -> Result<bool>;

    /// Delete a file or link
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn delete(&self, path: &str) -> Result<bool>;

    /// Check whether a node exists (links are not followed)
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn has(&self, path: &str) -> Result<bool>;

    /// Delete a directory and everything below it
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn delete_dir(&self, dirname: &str) -> Result<bool>;

    /// Create a directory and its missing parents
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the directory doesn't exist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn create_dir(&self, dirname: &str, options: &WriteOptions)
        -> Result<Option<DirectoryCreated>>;

    /// Describe a node
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the node doesn't exist or is a skipped link.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::NotSupported)` for a link under
    /// `LinkPolicy::Disallow`.
    async fn get_metadata(&self, path: &str) -> Result<Option<NormalizedMetadata>>;

    /// Describe a node; `size` is set for files
    ///
    /// # Errors
    ///
    /// Same as [`get_metadata`](Self::get_metadata).
    async fn get_size(&self, path: &str) -> Result<Option<NormalizedMetadata>> {
        self.get_metadata(path).await
    }

    /// Describe a node; `timestamp` is always set
    ///
    /// # Errors
    ///
    /// Same as [`get_metadata`](Self::get_metadata).
    async fn get_timestamp(&self, path: &str) -> Result<Option<NormalizedMetadata>> {
        self.get_metadata(path).await
    }

    /// Guess a MIME type from the path's extension
    fn get_mimetype(&self, path: &str) -> MimeInfo;

    /// Get the visibility label of a node
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the node can't be stat'ed.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn get_visibility(&self, path: &str) -> Result<Option<VisibilityInfo>>;

    /// Apply a visibility label to a node
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the label is unknown for the node's kind or the
    /// permission change is rejected.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the adapter isn't ready.
    async fn set_visibility(&self, path: &str, visibility: &str)
        -> Result<Option<VisibilityInfo>>;

    /// List a directory, optionally recursively
    ///
    /// # Returns
    ///
    /// Returns an empty list if `directory` doesn't exist or isn't a directory.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::NotSupported)` if a link is met under
    /// `LinkPolicy::Disallow`.
    async fn list_contents(&self, directory: &str, recursive: bool)
        -> Result<Vec<NormalizedMetadata>>;
}
