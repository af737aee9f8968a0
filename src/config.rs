//! Client configuration loaded from environment variables.
//!
//! Values come from the process environment, or a `.env` file via
//! `dotenvy`. Unset variables fall back to defaults; set but invalid
//! variables are reported as [`TaskboardError::Config`].

use crate::{
    error::{Result, TaskboardError},
    storage::StorageBackend,
};
use std::path::PathBuf;

const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_SESSION_FILE: &str = ".taskboard/session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Number of items requested per list load (`take`)
    pub page_size: u32,

    /// Where the file and SQLite backends keep the persisted session
    pub session_file: PathBuf,

    pub storage_backend: StorageBackend,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            storage_backend: StorageBackend::File,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `TASKBOARD_*` environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first so a `.env` file is honoured.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Config`] when a variable is set to a value
    /// that cannot be used.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let page_size = match lookup("TASKBOARD_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => defaults.page_size,
        };

        let session_file = lookup("TASKBOARD_SESSION_FILE")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let storage_backend = match lookup("TASKBOARD_STORAGE") {
            Some(raw) => raw.parse().map_err(TaskboardError::Config)?,
            None => defaults.storage_backend,
        };

        Ok(Self {
            page_size,
            session_file,
            storage_backend,
        })
    }
}

fn parse_page_size(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(TaskboardError::Config(
            "TASKBOARD_PAGE_SIZE must be greater than zero".to_string(),
        )),
        Ok(size) => Ok(size),
        Err(_) => Err(TaskboardError::Config(format!(
            "TASKBOARD_PAGE_SIZE is not a number: {}",
            raw
        ))),
    }
}
