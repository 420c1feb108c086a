//! Normalized node metadata
//!
//! Listing and metadata operations describe nodes with one canonical record,
//! [`NormalizedMetadata`], built fresh on every call by [`normalize`].

use crate::config::LinkPolicy;
use crate::error::{AdapterError, Result};
use crate::node::{Node, NodeKind};
use crate::path::PathPrefix;
use crate::traits::{AsyncMetadata, FsDriver};
use tracing::debug;

/// Canonical description of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMetadata {
    /// Node kind
    pub kind: NodeKind,
    /// Path relative to the adapter root, forward slashes
    pub path: String,
    /// Size in bytes (files only)
    pub size: Option<u64>,
    /// Modification time in seconds since the Unix epoch
    pub timestamp: Option<i64>,
    /// MIME type, when known
    pub mimetype: Option<String>,
    /// Visibility label, when known
    pub visibility: Option<String>,
}

impl NormalizedMetadata {
    /// Check if this record describes a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }

    /// Check if this record describes a file
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// Build the normalized record for a resolved node
///
/// Links are handled by `policy` before any stat. For other nodes the stat,
/// the size and the relative path are gathered concurrently.
///
/// # Parameters
///
/// * `driver` - Driver used for the stat calls
/// * `prefix` - Root prefix stripped from the node's location
/// * `policy` - What to do with a link
/// * `node` - Node with its kind already resolved
///
/// # Returns
///
/// Returns `Ok(None)` for a skipped link or a node that can no longer be
/// stat'ed (e.g. removed while a listing was in progress).
///
/// # Errors
///
/// Returns `Err(AdapterError::NotSupported)` if `node` is a link and `policy`
/// is [`LinkPolicy::Disallow`].
pub async fn normalize<D: FsDriver>(
    driver: &D,
    prefix: &PathPrefix,
    policy: LinkPolicy,
    node: &Node,
) -> Result<Option<NormalizedMetadata>> {
    if node.kind == NodeKind::Link {
        return match policy {
            LinkPolicy::Disallow => Err(AdapterError::NotSupported(format!(
                "Links are not supported, encountered link at {}",
                node.path.display()
            ))),
            LinkPolicy::Skip => {
                debug!("Skipping link {}", node.path.display());
                Ok(None)
            }
        };
    }

    let stat = driver.stat(&node.path);
    let size = async {
        if node.kind == NodeKind::File {
            driver.size(&node.path).await.map(Some)
        } else {
            Ok(None)
        }
    };
    let path = async { Ok::<_, AdapterError>(prefix.remove(&node.path)) };

    match futures::try_join!(stat, size, path) {
        Ok((metadata, size, path)) => Ok(Some(NormalizedMetadata {
            kind: node.kind,
            path,
            size,
            timestamp: Some(metadata.timestamp()),
            mimetype: None,
            visibility: None,
        })),
        Err(e) => {
            debug!("No metadata for {}: {}", node.path.display(), e);
            Ok(None)
        }
    }
}
