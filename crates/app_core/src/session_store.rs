//! Small JSON document of client-side state kept between runs

use crate::error::Result;
use crate::path;
use directories::ProjectDirs;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key of the last visited directory
pub const LAST_VISITED_PATH_KEY: &str = "last_visited_path";

/// File-backed key/value store
#[derive(Debug, Clone)]
pub struct SessionStore {
    file: Option<PathBuf>,
    values: Map<String, Value>,
}

impl SessionStore {
    /// Open (or start) the store at `file`; unreadable content starts empty
    pub fn open(file: &Path) -> Self {
        let values = match std::fs::read_to_string(file) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt session file {:?}: {}", file, e);
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };

        Self {
            file: Some(file.to_path_buf()),
            values,
        }
    }

    /// Store in the platform data directory
    pub fn open_default() -> Self {
        match Self::default_path() {
            Some(file) => Self::open(&file),
            None => Self::in_memory(),
        }
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            file: None,
            values: Map::new(),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "ImageDeck", "ImageDeck").map(|dirs| dirs.data_dir().join("session.json"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.get(key) == Some(value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(file, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }

    /// Remember the directory the browser is showing
    pub fn remember_path(&mut self, current_path: &str) -> Result<()> {
        self.set(LAST_VISITED_PATH_KEY, current_path)
    }

    /// Last visited directory if it still lies under `base_dir`; otherwise it is dropped
    pub fn restore_path(&mut self, base_dir: &str) -> Option<String> {
        let stored = self.get(LAST_VISITED_PATH_KEY)?.to_string();

        if path::is_under(base_dir, &stored) {
            return Some(stored);
        }

        tracing::info!("Discarding stored path {} outside {}", stored, base_dir);
        if let Err(e) = self.remove(LAST_VISITED_PATH_KEY) {
            tracing::warn!("Failed to update session file: {}", e);
        }
        None
    }
}
