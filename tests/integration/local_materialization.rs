//! Folder materialization against real directories

use super::test_utils::TestWorkspace;
use std::fs;
use std::sync::Barrier;
use std::thread;
use upfold::error::{MaterializeError, StorageError};
use upfold::materialize::{materialize_with, FolderMaterializer};
use upfold::records::InMemoryRecords;
use upfold::store::{LocalMount, LocalStorage, ResourceStorage};
use upfold::tree::ConfigTree;
use upfold::types::{CombinedIdentifier, FolderHandle, ResolutionContext};

fn sub_mount_storage(ws: &TestWorkspace) -> LocalStorage {
    let mut mount = LocalMount::new("fileadmin", ws.fileadmin());
    mount.writable = vec!["editors/team_a".to_string()];
    LocalStorage::new().with_mount(1, mount)
}

#[test]
fn test_creates_below_writable_sub_mount() {
    let ws = TestWorkspace::new();
    fs::create_dir_all(ws.fileadmin().join("editors/team_a")).unwrap();
    let storage = sub_mount_storage(&ws);

    let handle = FolderMaterializer::new(&storage)
        .materialize("1:/editors/team_a/2024/03")
        .unwrap();
    assert_eq!(handle.to_string(), "1:/editors/team_a/2024/03");
    assert!(ws.fileadmin().join("editors/team_a/2024/03").is_dir());
}

#[test]
fn test_outside_sub_mount_is_denied() {
    let ws = TestWorkspace::new();
    fs::create_dir_all(ws.fileadmin().join("editors/team_a")).unwrap();
    let storage = sub_mount_storage(&ws);

    let err = FolderMaterializer::new(&storage)
        .materialize("1:/editors/team_b/uploads")
        .unwrap_err();
    assert!(matches!(
        err,
        MaterializeError::Storage(StorageError::AccessDenied(_))
    ));
    assert!(!ws.fileadmin().join("editors/team_b").exists());
}

#[test]
fn test_existing_folder_is_reused() {
    let ws = TestWorkspace::new();
    fs::create_dir_all(ws.fileadmin().join("a/b")).unwrap();
    fs::write(ws.fileadmin().join("a/b/keep.txt"), "x").unwrap();
    let storage = ws.storage();

    let handle = FolderMaterializer::new(&storage).materialize("1:/a/b").unwrap();
    assert_eq!(handle.to_string(), "1:/a/b");
    assert!(ws.fileadmin().join("a/b/keep.txt").is_file());
}

#[test]
fn test_parent_segment_rejected() {
    let ws = TestWorkspace::new();
    let storage = ws.storage();

    let err = FolderMaterializer::new(&storage)
        .materialize("1:/../outside")
        .unwrap_err();
    assert!(matches!(
        err,
        MaterializeError::Storage(StorageError::AccessDenied(_))
    ));
    assert!(!ws.root().join("outside").exists());
}

#[test]
fn test_offline_storage_keeps_default() {
    let ws = TestWorkspace::new();
    let mut mount = LocalMount::new("fileadmin", ws.fileadmin());
    mount.online = false;
    let storage = LocalStorage::new().with_mount(1, mount);
    let installation =
        ConfigTree::from_dotted([("default_upload_folders.defaultForAllTables", "1:/new")]);
    let service =
        ws.service_with_storage(installation, ConfigTree::new(), InMemoryRecords::new(), storage);
    let default = FolderHandle::new(CombinedIdentifier::parse("1:/user_upload").unwrap());
    let context = ResolutionContext::new(Some("tt_content"), Some("image"), 1);

    let folder = service.resolve_and_ensure_upload_folder(&context, default.clone());
    assert_eq!(folder, default);
    assert!(!ws.fileadmin().join("new").exists());

    let info = service.folder_info(&context, "1:/new").unwrap();
    assert!(!info.valid);
    assert_eq!(info.display_path, "1:/new");
}

#[test]
fn test_relative_sub_folder_used_when_present() {
    let ws = TestWorkspace::new();
    fs::create_dir_all(ws.fileadmin().join("user_upload/news")).unwrap();
    let installation = ConfigTree::from_dotted([("default_upload_folders.tx_news", "news")]);
    let service = ws.service(installation, ConfigTree::new(), InMemoryRecords::new());
    let default = FolderHandle::new(CombinedIdentifier::parse("1:/user_upload").unwrap());
    let context = ResolutionContext::new(Some("tx_news"), Some("fal_media"), 1);

    let folder = service.resolve_and_ensure_upload_folder(&context, default);
    assert_eq!(folder.to_string(), "1:/user_upload/news");
}

#[test]
fn test_folder_created_concurrently_is_reused() {
    let ws = TestWorkspace::new();
    let storage = LocalStorage::new().with_mount(1, LocalMount::new("fileadmin", ws.fileadmin()));
    let other_creator = ws.fileadmin().join("x/y");

    let identifier = materialize_with(
        "1:/x/y",
        |candidate| storage.exists(candidate),
        |batch| {
            fs::create_dir_all(&other_creator).unwrap();
            storage.create_folders(batch)
        },
    )
    .unwrap();

    assert_eq!(identifier.to_string(), "1:/x/y");
    assert!(other_creator.is_dir());
    assert!(!ws.fileadmin().join("x_01").exists());
}

#[test]
fn test_racing_materializers_both_get_the_folder() {
    let ws = TestWorkspace::new();
    let storage = LocalStorage::new().with_mount(1, LocalMount::new("fileadmin", ws.fileadmin()));
    let barrier = Barrier::new(2);

    let results: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    FolderMaterializer::new(&storage).materialize("1:/x/y")
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(results
        .iter()
        .any(|r| matches!(r, Ok(handle) if handle.to_string() == "1:/x/y")));
    assert!(ws.fileadmin().join("x/y").is_dir());
}
