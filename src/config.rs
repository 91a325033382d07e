//! Runtime configuration.
//!
//! Loaded from a TOML file and passed into each component at construction
//! time; nothing reads ambient global state, so the reconciler and the
//! collaborators stay testable with fakes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ClassdavError, ClassdavResult};

fn default_input_dir() -> PathBuf {
    PathBuf::from("resources")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

/// Top-level configuration, usually at
/// `~/.config/classdav/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory of schedule CSV files.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory for generated .ics artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    pub caldav: CaldavConfig,

    /// Per-document CalDAV credentials, keyed by artifact file name
    /// (e.g. "2025p1.ics"). A document without an entry is skipped for
    /// both remote sync and storage upload.
    #[serde(default)]
    pub credentials: HashMap<String, Credential>,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cdn: CdnConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaldavConfig {
    /// CalDAV endpoint shared by every document.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Object-storage settings. Empty secrets mean uploads are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Bucket endpoint, e.g. "https://bucket.cos.ap-shanghai.myqcloud.com".
    #[serde(default)]
    pub endpoint: String,

    /// Key prefix inside the bucket, e.g. "calendars/".
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub secret_id: String,

    #[serde(default)]
    pub secret_key: String,
}

/// CDN purge settings. An empty endpoint disables purging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdnConfig {
    /// Purge API endpoint.
    #[serde(default)]
    pub endpoint: String,

    /// Path/URL whose cache is flushed after each upload.
    #[serde(default)]
    pub purge_path: String,
}

impl Config {
    /// Default config file location under the platform config directory.
    pub fn config_path() -> ClassdavResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ClassdavError::Config("could not determine config directory".to_string()))?
            .join("classdav");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> ClassdavResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClassdavError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            ClassdavError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Look up the credentials bound to one artifact file name.
    pub fn credential_for(&self, artifact_name: &str) -> Option<&Credential> {
        self.credentials.get(artifact_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            input_dir = "schedules"
            output_dir = "out"

            [caldav]
            url = "https://dav.example.com/"

            [credentials."2025p1.ics"]
            username = "p1"
            password = "secret"

            [storage]
            endpoint = "https://bucket.cos.ap-shanghai.myqcloud.com"
            path = "calendars/"
            secret_id = "id"
            secret_key = "key"

            [cdn]
            endpoint = "https://cdn.example.com/purge"
            purge_path = "https://static.example.com/calendars/"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("schedules"));
        assert_eq!(config.caldav.url, "https://dav.example.com/");
        assert_eq!(config.credential_for("2025p1.ics").unwrap().username, "p1");
        assert!(config.credential_for("2025p2.ics").is_none());
        assert_eq!(config.storage.path, "calendars/");
        assert_eq!(config.cdn.purge_path, "https://static.example.com/calendars/");
    }

    #[test]
    fn collaborator_sections_are_optional() {
        let toml = r#"
            [caldav]
            url = "https://dav.example.com/"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("resources"));
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert!(config.credentials.is_empty());
        assert!(config.storage.endpoint.is_empty());
        assert!(config.cdn.endpoint.is_empty());
    }
}
