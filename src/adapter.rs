//! Asynchronous filesystem adapter
//!
//! [`AsyncAdapter`] turns primitive driver calls into the full operation set
//! of [`FilesystemOperations`]. Every operation waits for the [`ReadyGate`],
//! maps relative paths through the root [`PathPrefix`], and then either
//! calls the driver directly or goes through the [`NodeResolver`] and
//! [`TreeWalker`]. Recoverable failures are logged at debug level and
//! reported as `false` / `None`.

use crate::backends::LocalDriver;
use crate::config::{AdapterConfig, LinkPolicy, WriteMode, WriteOptions};
use crate::error::{AdapterError, Result};
use crate::metadata::{normalize, NormalizedMetadata};
use crate::mime::detect_by_filename;
use crate::node::{NodeKind, NodeResolver};
use crate::path::{parent_of, PathPrefix};
use crate::ready::{ReadyGate, ReadyState};
use crate::stream::{pipe, ByteSink, ByteSource};
use crate::traits::{
    AsyncMetadata, DirectoryCreated, FileContents, FileStream, FilesystemOperations, FsDriver,
    MimeInfo, VisibilityInfo, WriteOutcome,
};
use crate::visibility::{PermissionMap, PUBLIC};
use crate::walker::TreeWalker;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Filesystem adapter rooted at one directory
///
/// # Examples
///
/// ```rust,ignore
/// use asyncfs::{AdapterConfig, FilesystemOperations, LocalAdapter, WriteOptions};
///
/// #[compio::main]
/// async fn main() -> asyncfs::Result<()> {
///     let adapter = LocalAdapter::local(AdapterConfig::new("/srv/storage")).await;
///     adapter.write("a/b.txt", b"hello", &WriteOptions::default()).await?;
///     assert!(adapter.has("a/b.txt").await?);
///     Ok(())
/// }
/// ```
pub struct AsyncAdapter<D: FsDriver> {
    driver: D,
    prefix: PathPrefix,
    gate: ReadyGate,
    permissions: PermissionMap,
    write_mode: WriteMode,
    link_policy: LinkPolicy,
}

/// Adapter over the local filesystem
pub type LocalAdapter = AsyncAdapter<LocalDriver>;

impl LocalAdapter {
    /// Create an adapter over the local filesystem
    pub async fn local(config: AdapterConfig) -> Self {
        Self::new(LocalDriver::new(), config).await
    }
}

impl<D: FsDriver> AsyncAdapter<D> {
    /// Create an adapter
    ///
    /// If the configured root is itself a symbolic link it is resolved to its
    /// real location once, here. The readiness check (create the root if
    /// needed, require it to be readable) runs on first use and its outcome
    /// is shared by every later call.
    pub async fn new(driver: D, config: AdapterConfig) -> Self {
        let permissions = config.permission_map();
        let root = Self::resolve_root(&driver, config.root()).await;
        let prefix = PathPrefix::new(&root);
        let gate = ReadyGate::initialize(driver.clone(), root, permissions.default_dir_bits());

        info!(
            "Created {} adapter at {} (write mode: {:?}, links: {:?})",
            driver.name(),
            prefix.as_str(),
            config.get_write_mode(),
            config.get_link_policy()
        );

        Self {
            driver,
            prefix,
            gate,
            permissions,
            write_mode: config.get_write_mode(),
            link_policy: config.get_link_policy(),
        }
    }

    async fn resolve_root(driver: &D, root: &Path) -> PathBuf {
        match driver.link_stat(root).await {
            Ok(metadata) if metadata.is_symlink() => match driver.canonicalize(root).await {
                Ok(real) => {
                    debug!("Root {} resolves to {}", root.display(), real.display());
                    real
                }
                Err(e) => {
                    warn!("Keeping unresolved root {}: {}", root.display(), e);
                    root.to_path_buf()
                }
            },
            _ => root.to_path_buf(),
        }
    }

    /// Wait until the root is ready
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` if the root cannot be
    /// created or read; the same error is returned on every call.
    pub async fn ready(&self) -> Result<()> {
        self.gate.wait().await
    }

    /// Get the readiness state without waiting
    #[must_use]
    pub fn state(&self) -> ReadyState {
        self.gate.state()
    }

    /// Get the root prefix
    #[must_use]
    pub const fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    /// Get the driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Get the permission map
    #[must_use]
    pub const fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    fn location(&self, path: &str) -> PathBuf {
        self.prefix.apply(path)
    }

    async fn ensure_parent(&self, path: &str) -> Result<()> {
        let parent = self.location(parent_of(path));
        self.driver
            .ensure_directory(&parent, self.permissions.default_dir_bits())
            .await
    }

    async fn apply_visibility(&self, location: &Path, kind: NodeKind, label: &str) -> Result<()> {
        let bits = self.permissions.resolve(kind, label)?;
        self.driver.chmod(location, bits).await
    }

    /// Kind used for permission lookups; links are judged by their target
    async fn permission_kind(&self, location: &Path) -> Result<NodeKind> {
        let node = NodeResolver::new(&self.driver).resolve(location).await;
        match node.kind {
            NodeKind::Link => {
                let metadata = self.driver.stat(location).await?;
                Ok(if metadata.is_dir() { NodeKind::Dir } else { NodeKind::File })
            }
            kind => Ok(kind),
        }
    }

    async fn write_contents<W: ByteSink>(mut writer: W, contents: &[u8]) -> Result<()> {
        let written = writer.write_all(contents.to_vec()).await;
        let closed = writer.close().await;
        written?;
        closed
    }

    async fn pipe_into<S: ByteSource>(
        &self,
        path: &str,
        source: S,
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        if !source.is_readable() {
            return Err(AdapterError::NotReadable(format!(
                "source for {path} is not readable"
            )));
        }

        let location = self.location(path);
        let opened = async {
            self.ready().await?;
            self.ensure_parent(path).await?;
            self.driver.open_write(&location, WriteMode::Truncate).await
        }
        .await;

        let destination = match opened {
            Ok(destination) => destination,
            Err(e) => {
                if let Err(close_err) = source.close().await {
                    debug!("Failed to close source for {}: {}", path, close_err);
                }
                return Err(e);
            }
        };

        let moved = pipe(source, destination).await?;

        let mut outcome = WriteOutcome::file(path);
        outcome.size = Some(moved);
        if let Some(label) = &options.visibility {
            self.apply_visibility(&location, NodeKind::File, label).await?;
            outcome.visibility = Some(label.clone());
        }

        debug!("Streamed {} bytes into {}", moved, path);
        Ok(outcome)
    }

    async fn try_update(
        &self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        let location = self.location(path);
        let writer = self.driver.open_existing(&location, self.write_mode).await?;
        Self::write_contents(writer, contents).await?;
        let size = self.driver.size(&location).await?;

        let mut outcome = WriteOutcome::file(path);
        outcome.size = Some(size);
        outcome.contents = Some(contents.to_vec());
        outcome.mimetype = Some(detect_by_filename(path).to_string());
        if let Some(label) = &options.visibility {
            self.apply_visibility(&location, NodeKind::File, label).await?;
            outcome.visibility = Some(label.clone());
        }
        Ok(outcome)
    }

    async fn try_set_visibility(&self, location: &Path, label: &str) -> Result<()> {
        let kind = self.permission_kind(location).await?;
        self.apply_visibility(location, kind, label).await
    }
}

/// Turn a recoverable failure into `false`, logging why
fn soft<T>(what: &str, path: &str, result: Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            debug!("{} {} failed: {}", what, path, e);
            false
        }
    }
}

impl<D: FsDriver> FilesystemOperations for AsyncAdapter<D> {
    type Stream = D::Reader;

    async fn write(
        &self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        self.ready().await?;
        let location = self.location(path);

        self.ensure_parent(path).await?;
        let writer = self.driver.open_write(&location, self.write_mode).await?;
        Self::write_contents(writer, contents).await?;
        let size = self.driver.size(&location).await?;

        let mut outcome = WriteOutcome::file(path);
        outcome.size = Some(size);
        outcome.contents = Some(contents.to_vec());
        if let Some(label) = &options.visibility {
            self.apply_visibility(&location, NodeKind::File, label).await?;
            outcome.visibility = Some(label.clone());
        }

        debug!("Wrote {} bytes to {}", size, path);
        Ok(outcome)
    }

    async fn write_stream<S: ByteSource>(
        &self,
        path: &str,
        source: S,
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        self.pipe_into(path, source, options).await
    }

    async fn update_stream<S: ByteSource>(
        &self,
        path: &str,
        source: S,
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        self.pipe_into(path, source, options).await
    }

    async fn update(
        &self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> Result<Option<WriteOutcome>> {
        self.ready().await?;
        match self.try_update(path, contents, options).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                debug!("update {} failed: {}", path, e);
                Ok(None)
            }
        }
    }

    async fn read_stream(&self, path: &str) -> Result<FileStream<Self::Stream>> {
        self.ready().await?;
        let stream = self.driver.open_read(&self.location(path)).await?;
        Ok(FileStream {
            kind: NodeKind::File,
            path: path.to_string(),
            stream,
        })
    }

    async fn read(&self, path: &str) -> Result<Option<FileContents>> {
        self.ready().await?;
        match self.driver.read_contents(&self.location(path)).await {
            Ok(contents) => Ok(Some(FileContents {
                kind: NodeKind::File,
                path: path.to_string(),
                contents,
            })),
            Err(e) => {
                debug!("read {} failed: {}", path, e);
                Ok(None)
            }
        }
    }

    async fn rename(&self, path: &str, newpath: &str) -> Result<bool> {
        self.ready().await?;
        let result = async {
            self.ensure_parent(newpath).await?;
            self.driver
                .rename(&self.location(path), &self.location(newpath))
                .await
        }
        .await;
        Ok(soft("rename", path, result))
    }

    async fn copy(&self, path: &str, newpath: &str) -> Result<bool> {
        self.ready().await?;
        let result = async {
            self.ensure_parent(newpath).await?;
            self.driver
                .copy(&self.location(path), &self.location(newpath))
                .await
        }
        .await;
        Ok(soft("copy", path, result))
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        self.ready().await?;
        let result = self.driver.remove(&self.location(path)).await;
        Ok(soft("delete", path, result))
    }

    async fn has(&self, path: &str) -> Result<bool> {
        self.ready().await?;
        Ok(self.driver.exists(&self.location(path)).await)
    }

    async fn delete_dir(&self, dirname: &str) -> Result<bool> {
        self.ready().await?;
        let result = TreeWalker::new(&self.driver)
            .remove_tree(&self.location(dirname))
            .await;
        Ok(soft("delete_dir", dirname, result))
    }

    async fn create_dir(
        &self,
        dirname: &str,
        options: &WriteOptions,
    ) -> Result<Option<DirectoryCreated>> {
        self.ready().await?;
        let created = DirectoryCreated {
            kind: NodeKind::Dir,
            path: dirname.to_string(),
        };

        let label = options.visibility.as_deref().unwrap_or(PUBLIC);
        let bits = match self.permissions.resolve(NodeKind::Dir, label) {
            Ok(bits) => bits,
            Err(e) => {
                debug!("create_dir {} failed: {}", dirname, e);
                return Ok(None);
            }
        };

        let location = self.location(dirname);
        match self.driver.create_dir_all(&location, bits).await {
            Ok(()) => Ok(Some(created)),
            Err(e) => {
                // Another caller may have created it in the meantime
                let node = NodeResolver::new(&self.driver).resolve(&location).await;
                if node.kind == NodeKind::Dir {
                    Ok(Some(created))
                } else {
                    debug!("create_dir {} failed: {}", dirname, e);
                    Ok(None)
                }
            }
        }
    }

    async fn get_metadata(&self, path: &str) -> Result<Option<NormalizedMetadata>> {
        self.ready().await?;
        let node = NodeResolver::new(&self.driver)
            .resolve(&self.location(path))
            .await;
        normalize(&self.driver, &self.prefix, self.link_policy, &node).await
    }

    fn get_mimetype(&self, path: &str) -> MimeInfo {
        MimeInfo {
            kind: NodeKind::File,
            path: path.to_string(),
            mimetype: detect_by_filename(path).to_string(),
        }
    }

    async fn get_visibility(&self, path: &str) -> Result<Option<VisibilityInfo>> {
        self.ready().await?;
        let location = self.location(path);
        let looked_up = async {
            let kind = self.permission_kind(&location).await?;
            let metadata = self.driver.stat(&location).await?;
            Ok::<_, AdapterError>((kind, metadata.permissions()))
        }
        .await;

        match looked_up {
            Ok((kind, bits)) => Ok(Some(VisibilityInfo {
                path: path.to_string(),
                visibility: self.permissions.reverse_lookup(kind, bits),
            })),
            Err(e) => {
                debug!("get_visibility {} failed: {}", path, e);
                Ok(None)
            }
        }
    }

    async fn set_visibility(
        &self,
        path: &str,
        visibility: &str,
    ) -> Result<Option<VisibilityInfo>> {
        self.ready().await?;
        match self.try_set_visibility(&self.location(path), visibility).await {
            Ok(()) => Ok(Some(VisibilityInfo {
                path: path.to_string(),
                visibility: visibility.to_string(),
            })),
            Err(e) => {
                debug!("set_visibility {} failed: {}", path, e);
                Ok(None)
            }
        }
    }

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<NormalizedMetadata>> {
        self.ready().await?;
        let location = self.location(directory);

        // A linked directory is judged by the link policy, never entered
        match self.driver.link_stat(&location).await {
            Ok(metadata) if metadata.is_symlink() => match self.link_policy {
                LinkPolicy::Disallow => {
                    return Err(AdapterError::NotSupported(format!(
                        "Links are not supported, encountered link at {}",
                        location.display()
                    )));
                }
                LinkPolicy::Skip => {
                    debug!("list_contents: skipping linked directory {}", directory);
                    return Ok(Vec::new());
                }
            },
            Ok(metadata) if metadata.is_dir() => {}
            _ => {
                debug!("list_contents: {} is not a directory", directory);
                return Ok(Vec::new());
            }
        }

        let walker = TreeWalker::new(&self.driver);
        let nodes = walker.walk(&location, recursive).await?;
        let records = walker
            .try_for_each(&nodes, |node| {
                normalize(&self.driver, &self.prefix, self.link_policy, node)
            })
            .await?;

        Ok(records.into_iter().flatten().collect())
    }
}
