//! Adapter integration tests on the local filesystem
//!
//! Covers the file and directory verbs, visibility mapping, metadata and the
//! ready gate.

use asyncfs::visibility::PermissionOverrides;
use asyncfs::{
    AdapterConfig, FilesystemOperations, LocalAdapter, NodeKind, ReadyState, WriteMode,
    WriteOptions,
};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

mod common;
use common::{adapter_in, adapter_with, mode_of};

// ============================================================================
// WRITE / READ
// ============================================================================

#[compio::test]
async fn test_write_read_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let outcome = adapter
        .write("docs/hello.txt", b"Hello, World!", &WriteOptions::default())
        .await
        .expect("write should succeed");

    assert_eq!(outcome.kind, NodeKind::File);
    assert_eq!(outcome.path, "docs/hello.txt");
    assert_eq!(outcome.size, Some(13));
    assert_eq!(outcome.contents.as_deref(), Some(&b"Hello, World!"[..]));
    assert_eq!(outcome.visibility, None);

    let file = adapter
        .read("docs/hello.txt")
        .await
        .expect("read should not fail")
        .expect("file should exist");
    assert_eq!(file.contents, b"Hello, World!");
    assert_eq!(file.path, "docs/hello.txt");
    assert!(temp_dir.path().join("root/docs/hello.txt").is_file());
}

#[compio::test]
async fn test_write_read_empty_contents() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let outcome = adapter
        .write("empty.txt", b"", &WriteOptions::default())
        .await
        .expect("empty write should succeed");
    assert_eq!(outcome.size, Some(0));

    let file = adapter
        .read("empty.txt")
        .await
        .expect("read should not fail")
        .expect("file should exist");
    assert!(file.contents.is_empty());
}

#[compio::test]
async fn test_write_truncates_by_default() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    adapter
        .write("f.txt", b"a long first version", &WriteOptions::default())
        .await
        .expect("first write");
    adapter
        .write("f.txt", b"short", &WriteOptions::default())
        .await
        .expect("second write");

    let file = adapter.read("f.txt").await.expect("read").expect("exists");
    assert_eq!(file.contents, b"short");
}

#[compio::test]
async fn test_append_mode() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_with(
        AdapterConfig::new(temp_dir.path().join("root")).write_mode(WriteMode::Append),
    )
    .await;

    adapter
        .write("log.txt", b"one\n", &WriteOptions::default())
        .await
        .expect("first write");
    let outcome = adapter
        .write("log.txt", b"two\n", &WriteOptions::default())
        .await
        .expect("second write");

    assert_eq!(outcome.size, Some(8));
    let file = adapter.read("log.txt").await.expect("read").expect("exists");
    assert_eq!(file.contents, b"one\ntwo\n");
}

#[compio::test]
async fn test_read_missing_file_is_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    assert!(adapter.read("nope.txt").await.expect("read").is_none());
}

#[compio::test]
async fn test_update_existing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("notes.txt", b"version one", &WriteOptions::default())
        .await
        .expect("write");

    let outcome = adapter
        .update("notes.txt", b"v2", &WriteOptions::default())
        .await
        .expect("update should not fail")
        .expect("file exists");

    assert_eq!(outcome.size, Some(2));
    assert_eq!(outcome.mimetype.as_deref(), Some("text/plain"));
    let file = adapter.read("notes.txt").await.expect("read").expect("exists");
    assert_eq!(file.contents, b"v2");
}

#[compio::test]
async fn test_update_missing_file_is_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let outcome = adapter
        .update("missing/notes.txt", b"data", &WriteOptions::default())
        .await
        .expect("update should not fail");

    assert!(outcome.is_none());
    assert!(!temp_dir.path().join("root/missing").exists());
}

// ============================================================================
// RENAME / COPY / DELETE / HAS
// ============================================================================

#[compio::test]
async fn test_copy_into_new_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("src.txt", b"payload", &WriteOptions::with_visibility("private"))
        .await
        .expect("write");

    assert!(adapter.copy("src.txt", "backup/2024/copy.txt").await.expect("copy"));

    let copy = adapter
        .read("backup/2024/copy.txt")
        .await
        .expect("read")
        .expect("copy exists");
    assert_eq!(copy.contents, b"payload");
    assert!(adapter.has("src.txt").await.expect("has"));
}

#[compio::test]
async fn test_rename_into_new_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("old.txt", b"moving", &WriteOptions::default())
        .await
        .expect("write");

    assert!(adapter.rename("old.txt", "archive/new.txt").await.expect("rename"));

    assert!(!adapter.has("old.txt").await.expect("has"));
    let moved = adapter
        .read("archive/new.txt")
        .await
        .expect("read")
        .expect("moved file exists");
    assert_eq!(moved.contents, b"moving");
}

#[compio::test]
async fn test_rename_and_copy_missing_source_is_false() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    assert!(!adapter.rename("ghost.txt", "b.txt").await.expect("rename"));
    assert!(!adapter.copy("ghost.txt", "b.txt").await.expect("copy"));
}

#[compio::test]
async fn test_delete() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("bye.txt", b"x", &WriteOptions::default())
        .await
        .expect("write");

    assert!(adapter.delete("bye.txt").await.expect("delete"));
    assert!(!adapter.has("bye.txt").await.expect("has"));
    // already gone
    assert!(!adapter.delete("bye.txt").await.expect("delete"));
}

// ============================================================================
// DIRECTORIES
// ============================================================================

#[compio::test]
async fn test_create_dir_returns_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let created = adapter
        .create_dir("a/b/c", &WriteOptions::default())
        .await
        .expect("create_dir")
        .expect("directory created");

    assert_eq!(created.kind, NodeKind::Dir);
    assert_eq!(created.path, "a/b/c");
    assert!(temp_dir.path().join("root/a/b/c").is_dir());

    // existing directory is still a success
    assert!(adapter
        .create_dir("a/b/c", &WriteOptions::default())
        .await
        .expect("create_dir")
        .is_some());
}

#[compio::test]
async fn test_concurrent_create_dir_both_succeed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    let options = WriteOptions::default();

    let (first, second) = futures::join!(
        adapter.create_dir("shared/deep/tree", &options),
        adapter.create_dir("shared/deep/tree", &options)
    );

    assert!(first.expect("first create_dir").is_some());
    assert!(second.expect("second create_dir").is_some());
    assert!(temp_dir.path().join("root/shared/deep/tree").is_dir());
}

#[compio::test]
async fn test_create_dir_below_file_is_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("blocker", b"x", &WriteOptions::default())
        .await
        .expect("write");

    let created = adapter
        .create_dir("blocker/sub", &WriteOptions::default())
        .await
        .expect("create_dir");

    assert!(created.is_none());
}

#[compio::test]
async fn test_create_dir_unknown_visibility_is_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let created = adapter
        .create_dir("x", &WriteOptions::with_visibility("secret"))
        .await
        .expect("create_dir");

    assert!(created.is_none());
    assert!(!temp_dir.path().join("root/x").exists());
}

#[compio::test]
async fn test_delete_dir_removes_everything() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    for path in ["tree/a.txt", "tree/x/b.txt", "tree/x/y/c.txt", "tree/x/y/z/d.txt"] {
        adapter
            .write(path, b"data", &WriteOptions::default())
            .await
            .expect("write");
    }
    adapter
        .create_dir("tree/empty", &WriteOptions::default())
        .await
        .expect("create_dir");

    assert!(adapter.delete_dir("tree").await.expect("delete_dir"));

    assert!(!temp_dir.path().join("root/tree").exists());
    assert!(adapter.list_contents("", true).await.expect("list").is_empty());
}

#[compio::test]
async fn test_delete_dir_missing_is_false() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    assert!(!adapter.delete_dir("not-here").await.expect("delete_dir"));
}

// ============================================================================
// LISTING AND METADATA
// ============================================================================

#[compio::test]
async fn test_list_missing_directory_is_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("file.txt", b"x", &WriteOptions::default())
        .await
        .expect("write");

    assert!(adapter
        .list_contents("does/not/exist", true)
        .await
        .expect("list")
        .is_empty());
    // a file is not a directory either
    assert!(adapter
        .list_contents("file.txt", false)
        .await
        .expect("list")
        .is_empty());
}

#[compio::test]
async fn test_list_shallow_and_recursive() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("top.txt", b"12", &WriteOptions::default())
        .await
        .expect("write");
    adapter
        .write("sub/inner.txt", b"1234", &WriteOptions::default())
        .await
        .expect("write");

    let mut shallow: Vec<String> = adapter
        .list_contents("", false)
        .await
        .expect("list")
        .into_iter()
        .map(|r| r.path)
        .collect();
    shallow.sort();
    assert_eq!(shallow, vec!["sub", "top.txt"]);

    let deep = adapter.list_contents("", true).await.expect("list");
    assert_eq!(deep.len(), 3);

    let inner = deep
        .iter()
        .find(|r| r.path == "sub/inner.txt")
        .expect("nested file listed");
    assert_eq!(inner.kind, NodeKind::File);
    assert_eq!(inner.size, Some(4));
    assert!(inner.timestamp.is_some());

    let sub = deep.iter().find(|r| r.path == "sub").expect("dir listed");
    assert!(sub.is_dir());
    assert_eq!(sub.size, None);
}

#[compio::test]
async fn test_list_subdirectory_paths_are_root_relative() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("a/b/c.txt", b"x", &WriteOptions::default())
        .await
        .expect("write");

    let records = adapter.list_contents("a", true).await.expect("list");
    let mut paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    paths.sort_unstable();

    assert_eq!(paths, vec!["a/b", "a/b/c.txt"]);
}

#[compio::test]
async fn test_get_metadata() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("m/file.bin", b"12345", &WriteOptions::default())
        .await
        .expect("write");
    set_file_mtime(
        temp_dir.path().join("root/m/file.bin"),
        FileTime::from_unix_time(1_500_000_000, 0),
    )
    .expect("Failed to set mtime");

    let file = adapter
        .get_metadata("m/file.bin")
        .await
        .expect("metadata")
        .expect("file exists");
    assert_eq!(file.kind, NodeKind::File);
    assert_eq!(file.path, "m/file.bin");
    assert_eq!(file.size, Some(5));
    assert_eq!(file.timestamp, Some(1_500_000_000));

    let size = adapter.get_size("m/file.bin").await.expect("size").expect("exists");
    assert_eq!(size.size, Some(5));
    let timestamp = adapter
        .get_timestamp("m/file.bin")
        .await
        .expect("timestamp")
        .expect("exists");
    assert_eq!(timestamp.timestamp, Some(1_500_000_000));

    let dir = adapter.get_metadata("m").await.expect("metadata").expect("dir exists");
    assert_eq!(dir.kind, NodeKind::Dir);
    assert_eq!(dir.size, None);

    assert!(adapter.get_metadata("m/none").await.expect("metadata").is_none());
}

#[compio::test]
async fn test_get_mimetype() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let info = adapter.get_mimetype("reports/q3.xlsx");
    assert_eq!(info.kind, NodeKind::File);
    assert_eq!(info.path, "reports/q3.xlsx");
    assert_eq!(
        info.mimetype,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        adapter.get_mimetype("blob.zzz").mimetype,
        "application/octet-stream"
    );
}

// ============================================================================
// VISIBILITY
// ============================================================================

#[compio::test]
async fn test_file_visibility_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    let location = temp_dir.path().join("root/secret.txt");

    let outcome = adapter
        .write("secret.txt", b"x", &WriteOptions::with_visibility("private"))
        .await
        .expect("write");
    assert_eq!(outcome.visibility.as_deref(), Some("private"));
    assert_eq!(mode_of(&location), 0o600);

    let info = adapter
        .get_visibility("secret.txt")
        .await
        .expect("get_visibility")
        .expect("file exists");
    assert_eq!(info.visibility, "private");

    let info = adapter
        .set_visibility("secret.txt", "public")
        .await
        .expect("set_visibility")
        .expect("label applied");
    assert_eq!(info.visibility, "public");
    assert_eq!(mode_of(&location), 0o644);
    assert_eq!(
        adapter
            .get_visibility("secret.txt")
            .await
            .expect("get_visibility")
            .expect("file exists")
            .visibility,
        "public"
    );
}

#[compio::test]
async fn test_directory_visibility_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    let location = temp_dir.path().join("root/vault");

    adapter
        .create_dir("vault", &WriteOptions::with_visibility("private"))
        .await
        .expect("create_dir")
        .expect("created");
    assert_eq!(
        adapter
            .get_visibility("vault")
            .await
            .expect("get_visibility")
            .expect("dir exists")
            .visibility,
        "private"
    );

    adapter
        .set_visibility("vault", "public")
        .await
        .expect("set_visibility")
        .expect("label applied");
    assert_eq!(mode_of(&location), 0o755);
    assert_eq!(
        adapter
            .get_visibility("vault")
            .await
            .expect("get_visibility")
            .expect("dir exists")
            .visibility,
        "public"
    );
}

#[compio::test]
async fn test_unmapped_bits_fall_back_to_octal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .create_dir("odd", &WriteOptions::default())
        .await
        .expect("create_dir");
    fs::set_permissions(
        temp_dir.path().join("root/odd"),
        fs::Permissions::from_mode(0o750),
    )
    .expect("Failed to chmod");

    let info = adapter
        .get_visibility("odd")
        .await
        .expect("get_visibility")
        .expect("dir exists");

    assert_eq!(info.visibility, "0750");
}

#[compio::test]
async fn test_permission_overrides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_with(
        AdapterConfig::new(temp_dir.path().join("root"))
            .permissions(PermissionOverrides::default().dir("private", 0o770).dir("yolo", 0o777)),
    )
    .await;
    adapter
        .create_dir("team", &WriteOptions::default())
        .await
        .expect("create_dir");

    adapter
        .set_visibility("team", "private")
        .await
        .expect("set_visibility")
        .expect("label applied");
    assert_eq!(mode_of(&temp_dir.path().join("root/team")), 0o770);
    assert_eq!(
        adapter
            .get_visibility("team")
            .await
            .expect("get_visibility")
            .expect("dir exists")
            .visibility,
        "private"
    );

    adapter
        .set_visibility("team", "yolo")
        .await
        .expect("set_visibility")
        .expect("label applied");
    assert_eq!(mode_of(&temp_dir.path().join("root/team")), 0o777);
}

#[compio::test]
async fn test_visibility_soft_failures() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;
    adapter
        .write("f.txt", b"x", &WriteOptions::default())
        .await
        .expect("write");

    assert!(adapter
        .set_visibility("f.txt", "unknown-label")
        .await
        .expect("set_visibility")
        .is_none());
    assert!(adapter
        .set_visibility("missing.txt", "public")
        .await
        .expect("set_visibility")
        .is_none());
    assert!(adapter
        .get_visibility("missing.txt")
        .await
        .expect("get_visibility")
        .is_none());
}

#[compio::test]
async fn test_write_with_unknown_visibility_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = adapter_in(&temp_dir).await;

    let result = adapter
        .write("f.txt", b"x", &WriteOptions::with_visibility("nope"))
        .await;

    assert!(result.is_err());
}

// ============================================================================
// READY GATE AND ROOT
// ============================================================================

#[compio::test]
async fn test_root_is_created_on_first_use() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path().join("deep/new/root");
    let adapter = LocalAdapter::local(AdapterConfig::new(&root)).await;

    assert_eq!(adapter.state(), ReadyState::Pending);
    adapter.ready().await.expect("root should be created");

    assert_eq!(adapter.state(), ReadyState::Ready);
    assert!(root.is_dir());
}

#[compio::test]
async fn test_ready_gate_failure_is_terminal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").expect("Failed to write blocker");
    let adapter = LocalAdapter::local(AdapterConfig::new(blocker.join("root"))).await;

    let first = adapter
        .write("a.txt", b"x", &WriteOptions::default())
        .await
        .expect_err("write must fail");
    let second = adapter.has("a.txt").await.expect_err("has must fail");
    let third = adapter
        .list_contents("", true)
        .await
        .expect_err("list must fail");

    assert!(first.is_initialization());
    assert!(second.is_initialization());
    assert!(third.is_initialization());
    assert_eq!(first.to_string(), second.to_string());
    assert!(matches!(adapter.state(), ReadyState::Failed(_)));

    // MIME lookup does not depend on the root
    assert_eq!(adapter.get_mimetype("a.txt").mimetype, "text/plain");
}

#[compio::test]
async fn test_symlinked_root_is_resolved() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let real = temp_dir.path().join("real");
    fs::create_dir(&real).expect("Failed to create real root");
    let alias = temp_dir.path().join("alias");
    std::os::unix::fs::symlink(&real, &alias).expect("Failed to create alias");

    let adapter = adapter_with(AdapterConfig::new(&alias)).await;

    assert_eq!(
        adapter.prefix().root(),
        fs::canonicalize(&real).expect("Failed to canonicalize")
    );

    adapter
        .write("inside/file.txt", b"x", &WriteOptions::default())
        .await
        .expect("write");
    assert!(real.join("inside/file.txt").is_file());

    let records = adapter.list_contents("", true).await.expect("list");
    let mut paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["inside", "inside/file.txt"]);
}
