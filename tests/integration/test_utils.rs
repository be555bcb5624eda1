//! Shared test utilities for integration tests
//!
//! A temporary workspace with a `fileadmin` directory mounted as storage 1 and
//! a fixed clock (2024-03-05) so date tokens are predictable.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use upfold::api::{StaticConfigSource, UploadFolderService};
use upfold::expand::FixedClock;
use upfold::records::InMemoryRecords;
use upfold::store::{LocalMount, LocalStorage};
use upfold::tree::ConfigTree;

pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("fileadmin/user_upload")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn fileadmin(&self) -> PathBuf {
        self.root().join("fileadmin")
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn storage(&self) -> LocalStorage {
        LocalStorage::new().with_mount(1, LocalMount::new("fileadmin", self.fileadmin()))
    }

    pub fn service(
        &self,
        installation: ConfigTree,
        actor: ConfigTree,
        records: InMemoryRecords,
    ) -> UploadFolderService {
        self.service_with_storage(installation, actor, records, self.storage())
    }

    pub fn service_with_storage(
        &self,
        installation: ConfigTree,
        actor: ConfigTree,
        records: InMemoryRecords,
        storage: LocalStorage,
    ) -> UploadFolderService {
        UploadFolderService::new(
            Arc::new(StaticConfigSource::new(installation, actor)),
            Arc::new(storage),
        )
        .with_records(Arc::new(records))
        .with_clock(Arc::new(FixedClock(march_fifth())))
    }
}

pub fn march_fifth() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}
