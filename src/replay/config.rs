//! Replay configuration
//!
//! A replay is described by one JSON document:
//!
//! ```json
//! {
//!   "source": "data/source.jsonl",
//!   "destination": "data/destination.jsonl",
//!   "source_schema": "schema/source.json",
//!   "destination_schema": "schema/destination.json",
//!   "start_revision": 1,
//!   "rewriters": [ { "kind": "revision-modification", "mode": "auto" } ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::event::{Revision, CURRENT_REVISION, FIRST_REVISION};
use crate::rewrite::RewriterSpec;

use super::errors::{ReplayError, ReplayResult};
use super::translate::UnknownTypePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Source store file (required)
    pub source: PathBuf,

    /// Destination store file (required, created if missing)
    pub destination: PathBuf,

    /// Schema of the source store. Without it rewriter type names are not validated.
    #[serde(default)]
    pub source_schema: Option<PathBuf>,

    /// Schema of the destination store (required)
    pub destination_schema: PathBuf,

    /// First source revision to read (default 1)
    #[serde(default = "default_start_revision")]
    pub start_revision: Revision,

    /// Source revision to stop before (default: read everything)
    #[serde(default = "default_stop_revision")]
    pub stop_revision: Revision,

    /// Continue the destination's history instead of starting at `start_revision`
    #[serde(default)]
    pub adopt_destination: bool,

    #[serde(default)]
    pub unknown_types: UnknownTypePolicy,

    /// Change-sets with more events are logged at INFO (default 1000)
    #[serde(default = "default_large_change_set")]
    pub large_change_set_threshold: usize,

    /// Progress is logged every this many change-sets, 0 disables (default 1000)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Pipeline stages, applied in order before identity translation
    #[serde(default)]
    pub rewriters: Vec<RewriterSpec>,
}

fn default_start_revision() -> Revision {
    FIRST_REVISION
}
fn default_stop_revision() -> Revision {
    CURRENT_REVISION
}
fn default_large_change_set() -> usize {
    1000
}
fn default_progress_interval() -> u64 {
    1000
}

impl ReplayConfig {
    /// Load, resolve and validate a configuration file
    pub fn load(path: &Path) -> ReplayResult<Self> {
        let label = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| ReplayError::config(&label, format!("Failed to read config: {}", e)))?;

        let mut config: ReplayConfig = serde_json::from_str(&content)
            .map_err(|e| ReplayError::config(&label, format!("Invalid config JSON: {}", e)))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate().map_err(|e| match e {
            ReplayError::Config { reason, .. } => ReplayError::config(&label, reason),
            other => other,
        })?;

        Ok(config)
    }

    /// Makes relative paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.source);
        resolve(&mut self.destination);
        resolve(&mut self.destination_schema);
        if let Some(schema) = self.source_schema.as_mut() {
            resolve(schema);
        }
    }

    pub fn validate(&self) -> ReplayResult<()> {
        if self.start_revision < FIRST_REVISION {
            return Err(ReplayError::config(
                "<config>",
                format!("start_revision must be >= {}, got {}", FIRST_REVISION, self.start_revision),
            ));
        }
        if self.stop_revision <= self.start_revision {
            return Err(ReplayError::config(
                "<config>",
                format!(
                    "stop_revision {} must be after start_revision {}",
                    self.stop_revision, self.start_revision
                ),
            ));
        }
        if self.source == self.destination {
            return Err(ReplayError::config("<config>", "source and destination must differ"));
        }
        if self.large_change_set_threshold == 0 {
            return Err(ReplayError::config("<config>", "large_change_set_threshold must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "source": "src.jsonl",
        "destination": "dst.jsonl",
        "destination_schema": "schema.json"
    }"#;

    #[test]
    fn test_defaults() {
        let config: ReplayConfig = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(config.start_revision, FIRST_REVISION);
        assert_eq!(config.stop_revision, CURRENT_REVISION);
        assert_eq!(config.unknown_types, UnknownTypePolicy::Fail);
        assert!(!config.adopt_destination);
        assert!(config.rewriters.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("replay.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = ReplayConfig::load(&path).unwrap();
        assert_eq!(config.source, dir.path().join("src.jsonl"));
        assert_eq!(config.destination_schema, dir.path().join("schema.json"));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut config: ReplayConfig = serde_json::from_str(MINIMAL).unwrap();
        config.start_revision = 5;
        config.stop_revision = 5;
        assert_eq!(config.validate().unwrap_err().code(), "HR_REPLAY_CONFIG");
    }

    #[test]
    fn test_same_store_rejected() {
        let mut config: ReplayConfig = serde_json::from_str(MINIMAL).unwrap();
        config.destination = config.source.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_value_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"source": 3}"#).unwrap();
        let err = ReplayConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
