//! Key-value settings stores.
//!
//! Values are JSON, addressed by a namespace (the plugin name) and a key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Environment variable overriding the data directory of [`JsonFileStore`].
pub const DATA_DIR_ENV: &str = "CHRONOSTAMP_DATA_DIR";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot determine a data directory (set {DATA_DIR_ENV})")]
    NoDataDir,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("malformed settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent key-value storage owned by the host.
pub trait SettingsStore {
    /// `Ok(None)` when nothing was saved under `namespace`/`key`.
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError>;

    fn save(&mut self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .values
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn save(&mut self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        self.values
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }
}

/// One `<namespace>.config.json` object per namespace in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the default data directory.
    ///
    /// Precedence: `CHRONOSTAMP_DATA_DIR` > platform config dir.
    /// - Linux: `~/.config/chronostamp/`
    /// - macOS: `~/Library/Application Support/chronostamp/`
    /// - Windows: `%APPDATA%\chronostamp\`
    pub fn from_env() -> Result<Self, StoreError> {
        Self::default_dir()
            .map(Self::new)
            .ok_or(StoreError::NoDataDir)
    }

    pub fn default_dir() -> Option<PathBuf> {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::config_dir().map(|p| p.join("chronostamp")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.config.json", namespace))
    }

    fn read_namespace(&self, path: &Path) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path(namespace);
        Ok(self.read_namespace(&path)?.remove(key))
    }

    fn save(&mut self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path(namespace);
        let mut map = self.read_namespace(&path)?;
        map.insert(key.to_string(), value);

        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let contents = serde_json::to_string_pretty(&map)?;
        fs::write(&path, contents).map_err(io_err)?;

        tracing::debug!(path = %path.display(), key, "Saved settings");
        Ok(())
    }
}
