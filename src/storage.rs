//! Object-storage upload for generated artifacts.
//!
//! Missing secrets are a skip condition, not an error, and upload failures
//! never propagate past this module.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::error::ClassdavResult;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ObjectStorage {
    http: Client,
    config: StorageConfig,
}

impl ObjectStorage {
    pub fn new(config: StorageConfig) -> ClassdavResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(ObjectStorage { http, config })
    }

    /// Upload one artifact under the configured key prefix.
    ///
    /// Returns whether the object landed; every failure path only logs.
    pub async fn upload(&self, local_path: &Path, key: &str) -> bool {
        if self.config.secret_id.is_empty() || self.config.secret_key.is_empty() {
            info!(key, "skipping storage upload, no secrets configured");
            return false;
        }

        let body = match tokio::fs::read(local_path).await {
            Ok(body) => body,
            Err(e) => {
                warn!(key, path = %local_path.display(), error = %e, "could not read artifact");
                return false;
            }
        };

        let url = format!(
            "{}/{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.path,
            key
        );

        match self
            .http
            .put(&url)
            .basic_auth(&self.config.secret_id, Some(&self.config.secret_key))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(key, "uploaded artifact to storage");
                true
            }
            Ok(response) => {
                warn!(key, status = %response.status(), "storage upload failed");
                false
            }
            Err(e) => {
                warn!(key, error = %e, "storage upload failed");
                false
            }
        }
    }
}
