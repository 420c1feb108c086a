//! asyncfs: asynchronous local filesystem adapter
//!
//! Turns primitive, non-blocking filesystem calls into higher-level
//! operations: writes with visibility, recursive directory creation and
//! deletion, normalized metadata and listings. Everything runs on a single
//! compio runtime thread; independent sub-operations are fanned out and
//! joined rather than serialized.
//!
//! # Layers
//!
//! - [`traits::FsDriver`] / [`backends::LocalDriver`]: primitive driver calls
//! - [`path`], [`visibility`], [`node`], [`ready`], [`walker`]: the building
//!   blocks (prefixing, label ↔ bits, kind detection, readiness, traversal)
//! - [`adapter::AsyncAdapter`]: the operation set from
//!   [`traits::FilesystemOperations`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use asyncfs::{AdapterConfig, FilesystemOperations, LocalAdapter, WriteOptions};
//!
//! #[compio::main]
//! async fn main() -> asyncfs::Result<()> {
//!     let adapter = LocalAdapter::local(AdapterConfig::new("/tmp/asyncfs-demo")).await;
//!
//!     adapter
//!         .write("notes/today.txt", b"hello", &WriteOptions::with_visibility("private"))
//!         .await?;
//!
//!     for entry in adapter.list_contents("", true).await? {
//!         println!("{} {}", entry.kind, entry.path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod mime;
pub mod node;
pub mod path;
pub mod ready;
pub mod stream;
pub mod traits;
pub mod visibility;
pub mod walker;

pub use adapter::{AsyncAdapter, LocalAdapter};
pub use backends::LocalDriver;
pub use config::{AdapterConfig, LinkPolicy, WriteMode, WriteOptions};
pub use error::{AdapterError, Result};
pub use metadata::NormalizedMetadata;
pub use node::{Node, NodeKind, NodeResolver};
pub use path::PathPrefix;
pub use ready::{ReadyGate, ReadyState};
pub use stream::{ByteSink, ByteSource, MemorySource, ReaderSource};
pub use traits::{FilesystemOperations, FsDriver};
pub use visibility::{PermissionMap, PermissionOverrides};
pub use walker::TreeWalker;
