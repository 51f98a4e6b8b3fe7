//! Runtime configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::service::RecordService;

/// Log filter used when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_FILTER: &str = "visit_tracker_core=info";

/// Tracker configuration, usually read from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// SQLite file holding the key-value store; in-memory when absent
    pub database_path: Option<PathBuf>,
    /// Directory exported documents are written to
    pub export_dir: Option<PathBuf>,
    /// `tracing` filter directive
    pub log_filter: Option<String>,
}

impl TrackerConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Effective log filter.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Open the configured store and build a record service over it.
    pub fn open_service(&self) -> anyhow::Result<RecordService<Database>> {
        let db = match &self.database_path {
            Some(path) => Database::open(path)
                .with_context(|| format!("opening database {}", path.display()))?,
            None => Database::open_in_memory().context("opening in-memory database")?,
        };
        Ok(RecordService::new(db))
    }
}
