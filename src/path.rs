//! Root prefix handling
//!
//! Callers address nodes with paths relative to the adapter root. The
//! prefix turns those into absolute locations and turns listed locations
//! back into canonical relative paths (forward slashes, no leading or
//! trailing separator).

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Root path plus separator
///
/// An empty prefix is the identity transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    /// Build a prefix from a root path
    ///
    /// Trailing separators are trimmed and exactly one separator appended;
    /// an empty root stays empty.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        let root = root.to_string_lossy();
        let trimmed = root.trim_end_matches(is_separator);

        let prefix = if trimmed.is_empty() {
            // "/" trims to nothing but still names the filesystem root
            if root.is_empty() {
                String::new()
            } else {
                MAIN_SEPARATOR.to_string()
            }
        } else {
            format!("{trimmed}{MAIN_SEPARATOR}")
        };

        Self { prefix }
    }

    /// Get the prefix string including its trailing separator
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Get the root directory the prefix was built from
    #[must_use]
    pub fn root(&self) -> PathBuf {
        if self.prefix.len() > 1 {
            PathBuf::from(self.prefix.trim_end_matches(is_separator))
        } else {
            PathBuf::from(&self.prefix)
        }
    }

    /// Turn a relative path into an absolute location
    ///
    /// Leading separators of `path` are dropped. An empty path yields the
    /// prefix itself.
    #[must_use]
    pub fn apply(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches(is_separator);
        PathBuf::from(format!("{}{relative}", self.prefix))
    }

    /// Turn an absolute location back into a canonical relative path
    ///
    /// Backslashes become forward slashes and surrounding separators are
    /// trimmed. Locations outside the prefix are only normalized.
    #[must_use]
    pub fn remove(&self, location: &Path) -> String {
        let location = location.to_string_lossy();
        let stripped = location
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(location.as_ref());
        canonical(stripped)
    }
}

/// Normalize a relative path to forward slashes without surrounding separators
#[must_use]
pub fn canonical(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_string()
}

/// Get the parent of a relative path, or `""` at the top level
#[must_use]
pub fn parent_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    trimmed.rfind(is_separator).map_or("", |idx| &trimmed[..idx])
}

/// Check if the last component of a location is `.` or `..`
#[must_use]
pub fn is_dot_entry(location: &Path) -> bool {
    let location = location.to_string_lossy();
    let last = location.rsplit(is_separator).next().unwrap_or_default();
    last == "." || last == ".."
}
