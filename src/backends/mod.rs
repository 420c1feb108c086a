//! Filesystem driver implementations
//!
//! The adapter is generic over [`crate::traits::FsDriver`]; this module holds
//! the concrete drivers it ships with.

pub mod local;

// Re-export main types for convenience
pub use local::{FileReader, FileWriter, LocalDriver, LocalMetadata};
