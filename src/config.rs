//! Adapter configuration
//!
//! Everything the adapter needs is fixed at construction: the root path,
//! how writes open files, what to do about symbolic links, and which
//! permission labels exist.

use crate::visibility::{PermissionMap, PermissionOverrides};
use std::path::{Path, PathBuf};

/// How `write` and `update` open an existing file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace existing contents
    #[default]
    Truncate,
    /// Keep existing contents and write after them
    Append,
}

/// Behavior when a listing meets a symbolic link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Leave links out of the results
    Skip,
    /// Fail the whole listing with `NotSupported`
    #[default]
    Disallow,
}

/// Per-call options for writes and directory creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Visibility label to apply after the write, if any
    pub visibility: Option<String>,
}

impl WriteOptions {
    /// Options that apply `label` once the node is written
    #[must_use]
    pub fn with_visibility(label: impl Into<String>) -> Self {
        Self {
            visibility: Some(label.into()),
        }
    }
}

/// Construction-time adapter configuration
///
/// # Examples
///
/// ```rust
/// use asyncfs::config::{AdapterConfig, LinkPolicy, WriteMode};
/// use asyncfs::visibility::PermissionOverrides;
///
/// let config = AdapterConfig::new("/srv/storage")
///     .write_mode(WriteMode::Append)
///     .link_policy(LinkPolicy::Skip)
///     .permissions(PermissionOverrides::default().dir("private", 0o770));
///
/// assert_eq!(config.root().to_str(), Some("/srv/storage"));
/// ```
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    root: PathBuf,
    write_mode: WriteMode,
    link_policy: LinkPolicy,
    permissions: PermissionOverrides,
}

impl AdapterConfig {
    /// Create a configuration rooted at `root` with default settings
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_mode: WriteMode::default(),
            link_policy: LinkPolicy::default(),
            permissions: PermissionOverrides::default(),
        }
    }

    /// Set the write mode
    #[must_use]
    pub const fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Set the link policy
    #[must_use]
    pub const fn link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    /// Set permission overrides merged over the defaults
    #[must_use]
    pub fn permissions(mut self, overrides: PermissionOverrides) -> Self {
        self.permissions = overrides;
        self
    }

    /// Get the configured root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the configured write mode
    #[must_use]
    pub const fn get_write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Get the configured link policy
    #[must_use]
    pub const fn get_link_policy(&self) -> LinkPolicy {
        self.link_policy
    }

    /// Build the permission map for this configuration
    #[must_use]
    pub fn permission_map(&self) -> PermissionMap {
        PermissionMap::build(&self.permissions)
    }
}
