//! Local filesystem driver
//!
//! Thin compio-backed implementation of [`FsDriver`]. File data moves through
//! positioned reads and writes on io_uring; calls the kernel only offers
//! synchronously (directory listing, recursive create/remove, chmod,
//! access checks) run on compio's blocking pool.

use crate::config::WriteMode;
use crate::error::{AdapterError, Result};
use crate::node::NodeKind;
use crate::stream::{ByteSink, ByteSource, DEFAULT_CHUNK_SIZE};
use crate::traits::{AsyncMetadata, DriverEntry, FsDriver};
use compio::fs::{File, OpenOptions};
use compio::io::{AsyncReadAt, AsyncWriteAt};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Run a synchronous filesystem call on the blocking pool
pub(crate) async fn blocking<T, F>(what: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    compio::runtime::spawn_blocking(f)
        .await
        .map_err(|e| AdapterError::FileSystem(format!("spawn_blocking failed for {what}: {e:?}")))?
}

/// Local filesystem driver using compio
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDriver;

impl LocalDriver {
    /// Create a new local driver
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FsDriver for LocalDriver {
    type Metadata = LocalMetadata;
    type Reader = FileReader;
    type Writer = FileWriter;

    async fn stat(&self, path: &Path) -> Result<Self::Metadata> {
        let metadata = compio::fs::metadata(path).await.map_err(|e| {
            AdapterError::FileSystem(format!("Failed to get metadata for {}: {e}", path.display()))
        })?;
        Ok(LocalMetadata::new(metadata))
    }

    async fn link_stat(&self, path: &Path) -> Result<Self::Metadata> {
        let metadata = compio::fs::symlink_metadata(path).await.map_err(|e| {
            AdapterError::FileSystem(format!(
                "Failed to get link metadata for {}: {e}",
                path.display()
            ))
        })?;
        Ok(LocalMetadata::new(metadata))
    }

    async fn open_read(&self, path: &Path) -> Result<Self::Reader> {
        let file = File::open(path).await.map_err(|e| {
            AdapterError::FileSystem(format!("Failed to open file {}: {e}", path.display()))
        })?;
        Ok(FileReader::new(file))
    }

    async fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Self::Writer> {
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if mode == WriteMode::Truncate {
            options.truncate(true);
        }

        let file = options.open(path).await.map_err(|e| {
            AdapterError::FileSystem(format!("Failed to create file {}: {e}", path.display()))
        })?;
        FileWriter::positioned(file, mode).await
    }

    async fn open_existing(&self, path: &Path, mode: WriteMode) -> Result<Self::Writer> {
        let mut options = OpenOptions::new();
        options.write(true);
        if mode == WriteMode::Truncate {
            options.truncate(true);
        }

        let file = options.open(path).await.map_err(|e| {
            AdapterError::FileSystem(format!("Failed to open file {}: {e}", path.display()))
        })?;
        FileWriter::positioned(file, mode).await
    }

    async fn read_contents(&self, path: &Path) -> Result<Vec<u8>> {
        let mut reader = self.open_read(path).await?;
        let contents = reader.read_to_end().await?;
        reader.close().await?;
        Ok(contents)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let (from, to) = (from.to_path_buf(), to.to_path_buf());
        blocking("rename", move || {
            std::fs::rename(&from, &to).map_err(|e| {
                AdapterError::FileSystem(format!(
                    "Failed to rename {} to {}: {e}",
                    from.display(),
                    to.display()
                ))
            })
        })
        .await
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let reader = self.open_read(from).await?;
        let writer = self.open_write(to, WriteMode::Truncate).await?;
        crate::stream::pipe(reader, writer).await
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        compio::fs::remove_file(path).await.map_err(|e| {
            AdapterError::FileSystem(format!("Failed to remove file {}: {e}", path.display()))
        })
    }

    async fn chmod(&self, path: &Path, bits: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let path = path.to_path_buf();
        blocking("chmod", move || {
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(bits)).map_err(|e| {
                AdapterError::FileSystem(format!(
                    "Failed to set permissions {bits:o} on {}: {e}",
                    path.display()
                ))
            })
        })
        .await
    }

    async fn list(&self, dir: &Path) -> Result<Vec<DriverEntry>> {
        let dir = dir.to_path_buf();
        blocking("list", move || {
            let read_dir = std::fs::read_dir(&dir).map_err(|e| {
                AdapterError::FileSystem(format!("Failed to read directory {}: {e}", dir.display()))
            })?;

            let mut entries = Vec::new();
            for entry in read_dir {
                let entry = entry.map_err(|e| {
                    AdapterError::FileSystem(format!(
                        "Failed to read directory entry in {}: {e}",
                        dir.display()
                    ))
                })?;
                let file_type = entry.file_type()?;
                entries.push(DriverEntry::new(
                    entry.path(),
                    NodeKind::from_file_type(file_type),
                ));
            }
            Ok(entries)
        })
        .await
    }

    async fn list_recursive(&self, dir: &Path) -> Result<Vec<DriverEntry>> {
        let dir = dir.to_path_buf();
        blocking("list_recursive", move || {
            WalkDir::new(&dir)
                .min_depth(1)
                .follow_links(false)
                .follow_root_links(false)
                .into_iter()
                .map(|entry| {
                    let entry = entry.map_err(|e| {
                        AdapterError::FileSystem(format!(
                            "Failed to walk directory {}: {e}",
                            dir.display()
                        ))
                    })?;
                    let kind = NodeKind::from_file_type(entry.file_type());
                    Ok(DriverEntry::new(entry.into_path(), kind))
                })
                .collect()
        })
        .await
    }

    async fn create_dir_all(&self, dir: &Path, bits: u32) -> Result<()> {
        use std::os::unix::fs::DirBuilderExt;

        let dir = dir.to_path_buf();
        blocking("create_dir_all", move || {
            std::fs::DirBuilder::new()
                .recursive(true)
                .mode(bits)
                .create(&dir)
                .map_err(|e| {
                    AdapterError::FileSystem(format!(
                        "Failed to create directory {}: {e}",
                        dir.display()
                    ))
                })
        })
        .await
    }

    async fn remove_dir_all(&self, dir: &Path) -> Result<()> {
        let dir = dir.to_path_buf();
        blocking("remove_dir_all", move || {
            std::fs::remove_dir_all(&dir).map_err(|e| {
                AdapterError::FileSystem(format!(
                    "Failed to remove directory {}: {e}",
                    dir.display()
                ))
            })
        })
        .await
    }

    async fn is_readable(&self, path: &Path) -> bool {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let Ok(path_cstr) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        blocking("access", move || {
            // SAFETY: path_cstr is a valid NUL-terminated string for the duration of the call
            let rc = unsafe { libc::access(path_cstr.as_ptr(), libc::R_OK) };
            Ok(rc == 0)
        })
        .await
        .unwrap_or(false)
    }

    async fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let path = path.to_path_buf();
        blocking("canonicalize", move || {
            std::fs::canonicalize(&path).map_err(|e| {
                AdapterError::FileSystem(format!("Failed to resolve {}: {e}", path.display()))
            })
        })
        .await
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Streaming reader over a local file
///
/// Reads advance an internal offset with positioned reads, so no seek state
/// is shared with other handles on the same file.
pub struct FileReader {
    file: Option<File>,
    offset: u64,
    chunk_size: usize,
}

impl FileReader {
    fn new(file: File) -> Self {
        Self {
            file: Some(file),
            offset: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different chunk size for subsequent reads
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl ByteSource for FileReader {
    fn is_readable(&self) -> bool {
        self.file.is_some()
    }

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(file) = self.file.as_ref() else {
            return Err(AdapterError::NotReadable("file reader is closed".to_string()));
        };

        let offset = self.offset;
        let buf_result = file.read_at(vec![0u8; self.chunk_size], offset).await;
        let bytes_read = buf_result.0.map_err(|e| {
            AdapterError::FileSystem(format!("Failed to read from file at offset {offset}: {e}"))
        })?;

        if bytes_read == 0 {
            // EOF
            self.file = None;
            return Ok(None);
        }

        let mut chunk = buf_result.1;
        chunk.truncate(bytes_read);
        self.offset += bytes_read as u64;
        Ok(Some(chunk))
    }

    async fn close(mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.close().await.map_err(|e| {
                AdapterError::FileSystem(format!("Failed to close file: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Streaming writer over a local file
pub struct FileWriter {
    file: File,
    offset: u64,
}

impl FileWriter {
    /// Wrap an open file, starting at its end in append mode
    async fn positioned(file: File, mode: WriteMode) -> Result<Self> {
        let offset = match mode {
            WriteMode::Truncate => 0,
            WriteMode::Append => file
                .metadata()
                .await
                .map_err(|e| AdapterError::FileSystem(format!("Failed to get file metadata: {e}")))?
                .len(),
        };
        Ok(Self { file, offset })
    }
}

impl ByteSink for FileWriter {
    async fn write_all(&mut self, data: Vec<u8>) -> Result<()> {
        let mut remaining = data;

        while !remaining.is_empty() {
            let offset = self.offset;
            let buf_result = self.file.write_at(remaining, offset).await;
            let bytes_written = buf_result.0.map_err(|e| {
                AdapterError::FileSystem(format!("Failed to write to file at offset {offset}: {e}"))
            })?;

            if bytes_written == 0 {
                return Err(AdapterError::FileSystem(
                    "Failed to write: no bytes written".to_string(),
                ));
            }

            self.offset += bytes_written as u64;
            remaining = buf_result.1;
            remaining.drain(..bytes_written);
        }

        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.file
            .sync_all()
            .await
            .map_err(|e| AdapterError::FileSystem(format!("Failed to sync file: {e}")))?;
        self.file
            .close()
            .await
            .map_err(|e| AdapterError::FileSystem(format!("Failed to close file: {e}")))
    }
}

/// Local metadata implementation using compio
pub struct LocalMetadata {
    metadata: compio::fs::Metadata,
}

impl LocalMetadata {
    const fn new(metadata: compio::fs::Metadata) -> Self {
        Self { metadata }
    }
}

impl AsyncMetadata for LocalMetadata {
    fn size(&self) -> u64 {
        self.metadata.len()
    }

    fn is_file(&self) -> bool {
        self.metadata.is_file()
    }

    fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    fn is_symlink(&self) -> bool {
        self.metadata.is_symlink()
    }

    fn permissions(&self) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        self.metadata.permissions().mode() & 0o7777
    }

    fn modified(&self) -> SystemTime {
        self.metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
    }
}
