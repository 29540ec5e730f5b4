//! Stream spec persistence
//!
//! The spec store is a JSON file holding the ordered list of stream
//! definitions. A missing file is not an error: a default single-entry list
//! is synthesized and written back so operators have something to edit.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Poll interval applied when a spec omits `poll_interval_seconds`.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_enabled() -> bool {
    true
}

/// Definition of one stream: where to fetch from and how often.
///
/// Immutable once loaded; a reload replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Unique stream name, also the RTSP path
    pub name: String,
    /// URL the snapshot is fetched from
    pub source_url: String,
    /// Seconds between fetches
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Whether the supervisor starts this stream automatically
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl StreamSpec {
    /// The poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SpecFile {
    streams: Vec<StreamSpec>,
}

/// Loads and persists stream specs at a fixed path.
#[derive(Debug, Clone)]
pub struct SpecStore {
    path: PathBuf,
}

impl SpecStore {
    /// Create a store reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the spec list, synthesizing the default file if none exists.
    ///
    /// Unreadable or malformed content, duplicate names, empty names, and
    /// zero poll intervals are all `Error::Config`.
    pub fn load(&self) -> Result<Vec<StreamSpec>> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "Spec file missing, writing defaults");
            return self.write_default();
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let file: SpecFile = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("invalid spec file {}: {}", self.path.display(), e))
        })?;

        validate(&file.streams)?;
        tracing::info!(
            path = %self.path.display(),
            streams = file.streams.len(),
            "Loaded stream specs"
        );
        Ok(file.streams)
    }

    /// The spec list written when no file exists yet.
    pub fn default_specs() -> Vec<StreamSpec> {
        vec![StreamSpec {
            name: "sample_stream".to_string(),
            source_url: "https://picsum.photos/640/480".to_string(),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            enabled: true,
        }]
    }

    fn write_default(&self) -> Result<Vec<StreamSpec>> {
        let specs = Self::default_specs();
        let file = SpecFile {
            streams: specs.clone(),
        };
        // Serializing our own fixed default cannot fail.
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::Config(format!("failed to serialize default specs: {}", e)))?;

        // A read-only location should not keep the service from running on
        // the in-memory defaults.
        let written = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(&self.path, json));
        if let Err(e) = written {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Could not persist default spec file"
            );
        }

        Ok(specs)
    }
}

fn validate(specs: &[StreamSpec]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for spec in specs {
        if spec.name.is_empty() {
            return Err(Error::Config("stream with empty name".to_string()));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::Config(format!("duplicate stream name: {}", spec.name)));
        }
        if spec.poll_interval_seconds == 0 {
            return Err(Error::Config(format!(
                "stream {} has a zero poll interval",
                spec.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SpecStore {
        SpecStore::new(dir.path().join("streams.json"))
    }

    #[test]
    fn test_missing_file_synthesizes_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let specs = store.load().unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "sample_stream");
        assert_eq!(specs[0].source_url, "https://picsum.photos/640/480");
        assert_eq!(specs[0].poll_interval_seconds, 5);
        assert!(specs[0].enabled);

        // The default list was persisted and loads back identically.
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), specs);
    }

    #[test]
    fn test_missing_parent_directories_created() {
        let dir = TempDir::new().unwrap();
        let store = SpecStore::new(dir.path().join("nested/config/streams.json"));

        store.load().unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn test_load_valid_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"streams": [
                {"name": "cam1", "source_url": "http://a/1.jpg", "poll_interval_seconds": 10, "enabled": true},
                {"name": "cam2", "source_url": "http://a/2.jpg", "poll_interval_seconds": 3, "enabled": false}
            ]}"#,
        )
        .unwrap();

        let specs = store.load().unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "cam1");
        assert_eq!(specs[0].poll_interval(), Duration::from_secs(10));
        assert!(!specs[1].enabled);
    }

    #[test]
    fn test_omitted_fields_take_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"streams": [{"name": "cam1", "source_url": "http://a/1.jpg"}]}"#,
        )
        .unwrap();

        let specs = store.load().unwrap();

        assert_eq!(specs[0].poll_interval_seconds, DEFAULT_POLL_INTERVAL_SECS);
        assert!(specs[0].enabled);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"streams": [
                {"name": "cam1", "source_url": "http://a/1.jpg"},
                {"name": "cam1", "source_url": "http://a/2.jpg"}
            ]}"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(err, Error::Config(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"streams": [{"name": "cam1", "source_url": "http://a/1.jpg", "poll_interval_seconds": 0}]}"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(err, Error::Config(msg) if msg.contains("zero poll interval")));
    }

    #[test]
    fn test_order_preserved() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"streams": [
                {"name": "z", "source_url": "http://a/z.jpg"},
                {"name": "a", "source_url": "http://a/a.jpg"},
                {"name": "m", "source_url": "http://a/m.jpg"}
            ]}"#,
        )
        .unwrap();

        let names: Vec<String> = store.load().unwrap().into_iter().map(|s| s.name).collect();

        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
