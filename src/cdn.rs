//! CDN cache purge.
//!
//! Fired after each artifact upload so consumers pulling the published
//! `.ics` URL see the new content. Failures are logged and never fatal.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::CdnConfig;
use crate::error::ClassdavResult;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CdnPurger {
    http: Client,
    config: CdnConfig,
    secret_id: String,
    secret_key: String,
}

impl CdnPurger {
    pub fn new(config: CdnConfig, secret_id: &str, secret_key: &str) -> ClassdavResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(CdnPurger {
            http,
            config,
            secret_id: secret_id.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    /// Flush the configured path. Returns whether the purge was accepted.
    pub async fn purge(&self) -> bool {
        if self.config.endpoint.is_empty() || self.config.purge_path.is_empty() {
            info!("skipping CDN purge, not configured");
            return false;
        }

        let body = serde_json::json!({
            "Paths": [self.config.purge_path],
            "FlushType": "flush",
        });

        match self
            .http
            .post(&self.config.endpoint)
            .basic_auth(&self.secret_id, Some(&self.secret_key))
            .json(&body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(path = %self.config.purge_path, "purged CDN cache");
                true
            }
            Ok(response) => {
                warn!(
                    path = %self.config.purge_path,
                    status = %response.status(),
                    "CDN purge failed"
                );
                false
            }
            Err(e) => {
                warn!(path = %self.config.purge_path, error = %e, "CDN purge failed");
                false
            }
        }
    }
}
