//! Shared fixtures for sync integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;
use tracing_subscriber::EnvFilter;
use trickipedia_storage::CacheStore;
use trickipedia_sync::{
    CatalogApiClient, CatalogSource, Connectivity, OfflineSync, SyncConfig, SyncError,
    SyncResult,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Routes `tracing` output through the test harness so swallowed sync
/// failures show up next to the failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trickipedia_sync=debug,trickipedia_storage=debug"))
        .with_test_writer()
        .try_init();
}

pub const TRICKS_PATH: &str = "/rest/v1/tricks";
pub const CATEGORIES_PATH: &str = "/rest/v1/master_categories";

pub fn test_config(server: &MockServer) -> SyncConfig {
    SyncConfig {
        api_base_url: server.uri(),
        api_key: Some("anon-key".into()),
        sync_interval_secs: 24 * 60 * 60,
        check_interval_secs: 3600,
        request_timeout_secs: 5,
    }
}

pub fn tricks_body() -> serde_json::Value {
    json!([
        {
            "id": "t1",
            "name": "Kickflip",
            "slug": "kickflip",
            "is_published": true,
            "subcategory": {
                "id": "s1", "name": "Flip Tricks", "slug": "flip-tricks",
                "master_category": {"id": "c1", "name": "Skateboarding", "slug": "skateboarding"}
            }
        },
        {
            "id": "t2",
            "name": "Backflip",
            "slug": "backflip",
            "is_published": true,
            "subcategory": {
                "id": "s3", "name": "Flips", "slug": "flips",
                "master_category": {"id": "c2", "name": "Parkour", "slug": "parkour"}
            }
        }
    ])
}

pub fn categories_body() -> serde_json::Value {
    json!([
        {
            "id": "c1", "name": "Skateboarding", "slug": "skateboarding",
            "subcategories": [
                {"id": "s1", "name": "Flip Tricks", "slug": "flip-tricks"},
                {"id": "s2", "name": "Grinds", "slug": "grinds"}
            ]
        },
        {
            "id": "c2", "name": "Parkour", "slug": "parkour",
            "subcategories": [
                {"id": "s3", "name": "Flips", "slug": "flips"}
            ]
        }
    ])
}

/// Mounts both catalog endpoints returning the standard fixtures.
pub async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(TRICKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tricks_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(CATEGORIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories_body()))
        .mount(server)
        .await;
}

/// An `OfflineSync` over a fresh in-memory store talking to `server`.
pub fn offline_sync(server: &MockServer, online: bool) -> OfflineSync {
    init_tracing();
    let config = test_config(server);
    let client = CatalogApiClient::new(config.clone()).unwrap();
    OfflineSync::new(
        CacheStore::open_in_memory().unwrap(),
        Arc::new(client),
        Connectivity::new(online),
        &config,
    )
}

/// In-process catalog source whose trick response can be swapped between
/// calls. Counts trick fetches.
pub struct ScriptedSource {
    tricks: Mutex<Result<Vec<serde_json::Value>, String>>,
    categories: Vec<serde_json::Value>,
    rendezvous: Option<Barrier>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn ok() -> Self {
        Self {
            tricks: Mutex::new(Ok(tricks_body().as_array().unwrap().clone())),
            categories: categories_body().as_array().unwrap().clone(),
            rendezvous: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Holds every trick fetch until `parties` fetches are in flight.
    pub fn with_rendezvous(parties: usize) -> Self {
        Self {
            rendezvous: Some(Barrier::new(parties)),
            ..Self::ok()
        }
    }

    pub fn set_tricks(&self, tricks: Vec<serde_json::Value>) {
        *self.tricks.lock().unwrap() = Ok(tricks);
    }

    pub fn fail_tricks(&self, error: &str) {
        *self.tricks.lock().unwrap() = Err(error.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_tricks(&self) -> SyncResult<Vec<serde_json::Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        let scripted = self.tricks.lock().unwrap().clone();
        scripted.map_err(SyncError::InvalidResponse)
    }

    async fn fetch_categories(&self) -> SyncResult<Vec<serde_json::Value>> {
        Ok(self.categories.clone())
    }
}

/// An `OfflineSync` over a fresh in-memory store fed by `source`.
pub fn scripted_sync(
    source: Arc<ScriptedSource>,
    config: &SyncConfig,
    online: bool,
) -> OfflineSync {
    init_tracing();
    OfflineSync::new(
        CacheStore::open_in_memory().unwrap(),
        source,
        Connectivity::new(online),
        config,
    )
}
