//! Shared fixtures for adapter integration tests

use asyncfs::{AdapterConfig, LocalAdapter};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

/// Create an adapter rooted at `<temp>/root` with default settings
#[allow(dead_code)]
pub async fn adapter_in(temp_dir: &TempDir) -> LocalAdapter {
    adapter_with(AdapterConfig::new(temp_dir.path().join("root"))).await
}

/// Create an adapter from `config` and wait until it is ready
#[allow(dead_code)]
pub async fn adapter_with(config: AdapterConfig) -> LocalAdapter {
    let adapter = LocalAdapter::local(config).await;
    adapter.ready().await.expect("adapter root should be ready");
    adapter
}

/// Get the low four octal digits of a node's mode
#[allow(dead_code)]
pub fn mode_of(path: &Path) -> u32 {
    fs::metadata(path)
        .expect("Failed to get metadata")
        .permissions()
        .mode()
        & 0o7777
}

/// Create `<root>/dir` containing files, a nested directory and a link
///
/// Layout:
/// - `dir/a.txt`
/// - `dir/nested/b.txt`
/// - `dir/link` -> `dir/a.txt`
#[allow(dead_code)]
pub fn tree_with_link(root: &Path) {
    let dir = root.join("dir");
    fs::create_dir_all(dir.join("nested")).expect("Failed to create tree");
    fs::write(dir.join("a.txt"), b"a").expect("Failed to write a.txt");
    fs::write(dir.join("nested/b.txt"), b"bb").expect("Failed to write b.txt");
    std::os::unix::fs::symlink(dir.join("a.txt"), dir.join("link")).expect("Failed to create link");
}
