//! Core traits for the adapter layers
//!
//! This module provides the contracts the adapter is built from: the
//! primitive driver ([`FsDriver`]), the metadata it returns
//! ([`AsyncMetadata`]), and the operation set exposed to callers
//! ([`FilesystemOperations`]). All of them work with compio's async I/O model.

pub mod driver;
pub mod metadata;
pub mod operations;

// Re-export main traits for convenience
pub use driver::{DriverEntry, FsDriver};
pub use metadata::AsyncMetadata;
pub use operations::{
    DirectoryCreated, FileContents, FileStream, FilesystemOperations, MimeInfo, VisibilityInfo,
    WriteOutcome,
};
