//! Byte streams and end-to-end piping
//!
//! Stream operations never buffer a whole file: a [`ByteSource`] is drained
//! chunk by chunk straight into a [`ByteSink`]. Both ends are consumed by
//! [`pipe`], which closes each of them exactly once whichever side fails.

use crate::backends::local::blocking;
use crate::error::{AdapterError, Result};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

/// Default chunk size for stream reads (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A readable byte stream
///
/// # Examples
///
/// ```rust,ignore
/// let mut stream = adapter.read_stream("report.csv").await?.stream;
/// while let Some(chunk) = stream.read_chunk().await? {
///     consume(&chunk);
/// }
/// stream.close().await?;
/// ```
pub trait ByteSource: 'static {
    /// Check whether the stream can still produce data
    ///
    /// A source that was closed, or was never opened for reading, reports
    /// `false`. Stream writes refuse such sources before touching the disk.
    fn is_readable(&self) -> bool;

    /// Read the next chunk
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(chunk))` while data remains and `Ok(None)` at the end
    /// of the stream. Chunks are never empty.
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the underlying read fails.
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Release the stream
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if releasing the underlying handle fails.
    async fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Drain the remaining chunks into one buffer
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if any chunk read fails.
    async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut contents = Vec::new();
        while let Some(chunk) = self.read_chunk().await? {
            contents.extend_from_slice(&chunk);
        }
        Ok(contents)
    }
}

/// A writable byte stream
pub trait ByteSink: 'static {
    /// Write the whole buffer, retrying partial writes
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if the write fails or makes no progress.
    async fn write_all(&mut self, data: Vec<u8>) -> Result<()>;

    /// Flush and release the stream
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError)` if flushing fails.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// In-memory byte source
///
/// Used to feed stream writes from data already held by the caller, and as a
/// test double for readers.
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: VecDeque<Vec<u8>>,
    readable: bool,
}

impl MemorySource {
    /// Create a source that yields `data` in [`DEFAULT_CHUNK_SIZE`] chunks
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        Self::from_chunks(data.chunks(DEFAULT_CHUNK_SIZE).map(<[u8]>::to_vec))
    }

    /// Create a source that yields the given chunks in order
    ///
    /// Empty chunks are dropped.
    #[must_use]
    pub fn from_chunks(chunks: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into_iter().filter(|c| !c.is_empty()).collect(),
            readable: true,
        }
    }

    /// Create a source that has already been closed
    #[must_use]
    pub fn closed() -> Self {
        Self {
            chunks: VecDeque::new(),
            readable: false,
        }
    }
}

impl ByteSource for MemorySource {
    fn is_readable(&self) -> bool {
        self.readable
    }

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.readable {
            return Err(AdapterError::NotReadable(
                "memory source is closed".to_string(),
            ));
        }
        Ok(self.chunks.pop_front())
    }

    async fn close(mut self) -> Result<()> {
        self.readable = false;
        self.chunks.clear();
        Ok(())
    }
}

/// Byte source over a synchronous reader such as stdin
///
/// Each chunk is read on the blocking pool, so a slow producer never stalls
/// the runtime thread. Like a file reader, the source stops being readable
/// once it reaches the end.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: Option<R>,
    chunk_size: usize,
}

impl<R: Read + Send + 'static> ReaderSource<R> {
    /// Create a source reading [`DEFAULT_CHUNK_SIZE`] chunks from `reader`
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the maximum chunk size
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl<R: Read + Send + 'static> ByteSource for ReaderSource<R> {
    fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(mut reader) = self.reader.take() else {
            return Err(AdapterError::NotReadable(
                "reader source is closed".to_string(),
            ));
        };

        let chunk_size = self.chunk_size;
        let (reader, chunk) = blocking("read_chunk", move || {
            let mut buf = vec![0u8; chunk_size];
            let len = loop {
                match reader.read(&mut buf) {
                    Ok(len) => break len,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => return Err(AdapterError::from(e)),
                }
            };
            buf.truncate(len);
            Ok((reader, buf))
        })
        .await?;

        if chunk.is_empty() {
            return Ok(None);
        }
        self.reader = Some(reader);
        Ok(Some(chunk))
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Pipe a source into a sink until the source ends
///
/// The source is closed once it is exhausted or fails, and the sink is closed
/// afterwards in every case. The first error observed wins: a read or write
/// failure is reported ahead of any error raised while closing.
///
/// # Returns
///
/// Returns the number of bytes moved.
///
/// # Errors
///
/// Returns `Err(AdapterError)` if reading, writing, or closing either end
/// fails.
pub async fn pipe<S, W>(mut source: S, mut destination: W) -> Result<u64>
where
    S: ByteSource,
    W: ByteSink,
{
    let mut moved = 0u64;

    let transfer = loop {
        match source.read_chunk().await {
            Ok(Some(chunk)) => {
                let len = chunk.len() as u64;
                if let Err(e) = destination.write_all(chunk).await {
                    break Err(e);
                }
                moved += len;
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    let source_closed = source.close().await;
    let destination_closed = destination.close().await;

    transfer?;
    source_closed?;
    destination_closed?;
    Ok(moved)
}
