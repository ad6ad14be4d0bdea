//! Shared test fixtures: roster, in-memory database and a recording media host

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use daisy_common::db::init_memory_database;
use daisy_common::{ResourceKind, RosterStore, Student};
use daisy_portal::services::{MediaHost, MediaHostError, UploadRequest, UploadedMedia};
use sqlx::SqlitePool;

pub fn student(adm: &str, name: &str, department: &str, bio: &str) -> Student {
    Student {
        admission_number: adm.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        default_biography: bio.to_string(),
        fields: BTreeMap::new(),
    }
}

pub fn test_roster() -> Arc<RosterStore> {
    Arc::new(RosterStore::from_students(vec![
        student("A100", "Alice", "Germans", "Loves reading"),
        student("B200", "Bob", "Italians", ""),
        student("C300", "Carol", "Germans", "Paints"),
    ]))
}

pub async fn test_pool() -> SqlitePool {
    init_memory_database().await.expect("in-memory database")
}

/// Media host double that records every call
#[derive(Default)]
pub struct FakeMediaHost {
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub destroys: Mutex<Vec<(String, ResourceKind)>>,
    /// Filenames whose upload fails
    pub failing_files: Vec<String>,
    pub fail_destroy: bool,
    counter: AtomicUsize,
}

impl FakeMediaHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_uploads(files: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing_files: files.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn failing_destroy() -> Arc<Self> {
        Arc::new(Self {
            fail_destroy: true,
            ..Default::default()
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn destroy_calls(&self) -> Vec<(String, ResourceKind)> {
        self.destroys.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedMedia, MediaHostError> {
        self.uploads.lock().unwrap().push(request.clone());

        if self.failing_files.contains(&request.filename) {
            return Err(MediaHostError::Api(500, "upload exploded".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let external_id = format!("{}/media-{}", request.folder, n);
        Ok(UploadedMedia {
            url: format!("https://media.test/{}", external_id),
            external_id,
        })
    }

    async fn destroy(&self, external_id: &str, resource: ResourceKind) -> Result<(), MediaHostError> {
        self.destroys
            .lock()
            .unwrap()
            .push((external_id.to_string(), resource));

        if self.fail_destroy {
            return Err(MediaHostError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}
