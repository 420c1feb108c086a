//! Visibility labels and permission bits
//!
//! A [`PermissionMap`] translates symbolic labels ("public", "private", or
//! anything an override adds) into mode bits per node kind, and translates
//! mode bits back into labels.

use crate::error::{AdapterError, Result};
use crate::node::NodeKind;

/// Label used when no visibility is requested
pub const PUBLIC: &str = "public";

/// Label for owner-only access
pub const PRIVATE: &str = "private";

/// Default file permissions (`public` = 0644, `private` = 0600)
const DEFAULT_FILE: [(&str, u32); 2] = [(PUBLIC, 0o644), (PRIVATE, 0o600)];

/// Default directory permissions (`public` = 0755, `private` = 0700)
const DEFAULT_DIR: [(&str, u32); 2] = [(PUBLIC, 0o755), (PRIVATE, 0o700)];

/// Label overrides for one or both node kinds
///
/// # Examples
///
/// ```rust
/// use asyncfs::visibility::{PermissionMap, PermissionOverrides};
/// use asyncfs::node::NodeKind;
///
/// let overrides = PermissionOverrides::default()
///     .dir("private", 0o770)
///     .dir("sticky", 0o1777);
/// let map = PermissionMap::build(&overrides);
///
/// assert_eq!(map.resolve(NodeKind::Dir, "private").unwrap(), 0o770);
/// assert_eq!(map.resolve(NodeKind::Dir, "public").unwrap(), 0o755);
/// assert_eq!(map.reverse_lookup(NodeKind::Dir, 0o1777), "sticky");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionOverrides {
    /// File labels to add or replace
    pub file: Vec<(String, u32)>,
    /// Directory labels to add or replace
    pub dir: Vec<(String, u32)>,
}

impl PermissionOverrides {
    /// Add or replace a file label
    #[must_use]
    pub fn file(mut self, label: impl Into<String>, bits: u32) -> Self {
        self.file.push((label.into(), bits));
        self
    }

    /// Add or replace a directory label
    #[must_use]
    pub fn dir(mut self, label: impl Into<String>, bits: u32) -> Self {
        self.dir.push((label.into(), bits));
        self
    }
}

/// Immutable label ↔ bits mapping for files and directories
///
/// Labels keep their insertion order: defaults first, then labels introduced
/// by overrides. Replacing an existing label keeps its position, so reverse
/// lookups prefer the earliest matching label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMap {
    file: Vec<(String, u32)>,
    dir: Vec<(String, u32)>,
}

impl Default for PermissionMap {
    fn default() -> Self {
        Self::build(&PermissionOverrides::default())
    }
}

impl PermissionMap {
    /// Merge `overrides` over the built-in defaults
    #[must_use]
    pub fn build(overrides: &PermissionOverrides) -> Self {
        let mut file = to_owned_labels(&DEFAULT_FILE);
        let mut dir = to_owned_labels(&DEFAULT_DIR);

        merge(&mut file, &overrides.file);
        merge(&mut dir, &overrides.dir);

        Self { file, dir }
    }

    fn labels(&self, kind: NodeKind) -> Option<&[(String, u32)]> {
        match kind {
            NodeKind::File => Some(&self.file),
            NodeKind::Dir => Some(&self.dir),
            NodeKind::Link => None,
        }
    }

    /// Translate a label into mode bits
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::UnknownVisibility)` if `kind` has no
    /// mapping (links) or `label` is not configured for it.
    pub fn resolve(&self, kind: NodeKind, label: &str) -> Result<u32> {
        self.labels(kind)
            .and_then(|labels| labels.iter().find(|(name, _)| name == label))
            .map(|(_, bits)| *bits)
            .ok_or_else(|| AdapterError::UnknownVisibility {
                kind,
                label: label.to_string(),
            })
    }

    /// Translate mode bits into a label
    ///
    /// Only the low four octal digits of `bits` are compared. When no label
    /// matches exactly the bits are returned as four octal digits, e.g.
    /// `"0750"`.
    #[must_use]
    pub fn reverse_lookup(&self, kind: NodeKind, bits: u32) -> String {
        let bits = bits & 0o7777;
        self.labels(kind)
            .and_then(|labels| labels.iter().find(|(_, b)| *b == bits))
            .map_or_else(|| octal_label(bits), |(name, _)| name.clone())
    }

    /// Get the directory bits used when creating parents and the root
    #[must_use]
    pub fn default_dir_bits(&self) -> u32 {
        self.resolve(NodeKind::Dir, PUBLIC).unwrap_or(0o755)
    }
}

/// Format mode bits as four octal digits
#[must_use]
pub fn octal_label(bits: u32) -> String {
    format!("{:04o}", bits & 0o7777)
}

fn to_owned_labels(defaults: &[(&str, u32)]) -> Vec<(String, u32)> {
    defaults
        .iter()
        .map(|(label, bits)| ((*label).to_string(), *bits))
        .collect()
}

fn merge(base: &mut Vec<(String, u32)>, overrides: &[(String, u32)]) {
    for (label, bits) in overrides {
        match base.iter_mut().find(|(name, _)| name == label) {
            Some(existing) => existing.1 = *bits,
            None => base.push((label.clone(), *bits)),
        }
    }
}
