//! AsyncMetadata trait for driver-level stat results
//!
//! Drivers hand back their own metadata type; the adapter only needs the
//! handful of facts below to build normalized records and visibility labels.

use std::time::{SystemTime, UNIX_EPOCH};

/// Stat result produced by a driver
///
/// # Examples
///
/// ```rust,ignore
/// let metadata = driver.stat(path).await?;
/// println!("Size: {} bytes", metadata.size());
/// println!("Permissions: {:o}", metadata.permissions());
/// ```
pub trait AsyncMetadata: 'static {
    /// Get the size of the node in bytes
    ///
    /// # Returns
    ///
    /// Returns the size in bytes. For directories, this is filesystem specific.
    fn size(&self) -> u64;

    /// Check if this is a regular file
    fn is_file(&self) -> bool;

    /// Check if this is a directory
    fn is_dir(&self) -> bool;

    /// Check if this is a symlink
    ///
    /// Only meaningful for metadata obtained without following links.
    fn is_symlink(&self) -> bool;

    /// Get permission bits
    ///
    /// # Returns
    ///
    /// Returns the low four octal digits of the mode (e.g., `0o1777`).
    fn permissions(&self) -> u32;

    /// Get last modification time
    fn modified(&self) -> SystemTime;

    /// Get the modification time as whole seconds since the Unix epoch
    ///
    /// Times before the epoch come back negative.
    fn timestamp(&self) -> i64 {
        match self.modified().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_secs()).unwrap_or(i64::MAX),
        }
    }
}
