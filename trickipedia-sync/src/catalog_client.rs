//! HTTP client for the hosted catalog backend.
//!
//! Issues PostgREST-style bulk reads with embedded relations, so each row
//! arrives as a denormalized snapshot ready to cache.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Trick rows embed their subcategory and its master category.
pub const TRICKS_SELECT: &str =
    "*,subcategory:subcategories(id,name,slug,master_category:master_categories(id,name,slug))";

/// Category rows embed their subcategories.
pub const CATEGORIES_SELECT: &str = "*,subcategories(*)";

const TRICKS_PATH: &str = "/rest/v1/tricks";
const CATEGORIES_PATH: &str = "/rest/v1/master_categories";

/// Source of full catalog snapshots.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every trick, denormalized with its category chain.
    async fn fetch_tricks(&self) -> SyncResult<Vec<serde_json::Value>>;

    /// Every top-level category with nested subcategories.
    async fn fetch_categories(&self) -> SyncResult<Vec<serde_json::Value>>;
}

/// HTTP catalog client.
pub struct CatalogApiClient {
    client: Client,
    config: SyncConfig,
}

impl CatalogApiClient {
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    async fn fetch_collection(
        &self,
        path: &str,
        select: &str,
    ) -> SyncResult<Vec<serde_json::Value>> {
        let url = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
        let mut req = self.client.get(&url).query(&[("select", select)]);
        if let Some(key) = &self.config.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        match serde_json::from_slice::<serde_json::Value>(&body)? {
            serde_json::Value::Array(rows) => {
                debug!("fetched {} rows from {path}", rows.len());
                Ok(rows)
            }
            other => Err(SyncError::InvalidResponse(format!(
                "expected a JSON array from {path}, got {}",
                json_kind(&other)
            ))),
        }
    }
}

#[async_trait]
impl CatalogSource for CatalogApiClient {
    async fn fetch_tricks(&self) -> SyncResult<Vec<serde_json::Value>> {
        self.fetch_collection(TRICKS_PATH, TRICKS_SELECT).await
    }

    async fn fetch_categories(&self) -> SyncResult<Vec<serde_json::Value>> {
        self.fetch_collection(CATEGORIES_PATH, CATEGORIES_SELECT).await
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
