use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::fs;

pub const USERS_KEY: &str = "users";
pub const PRODUCTS_KEY: &str = "products";
pub const SALES_KEY: &str = "sales";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage document {key} is malformed: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key/value mirror: one JSON document per key inside a data directory.
/// A disabled instance keeps nothing and loads nothing.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path_for(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{key}.json"))
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(dir) = &self.dir else {
            return Ok(None);
        };
        let raw = match fs::read(Self::path_for(dir, key)).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                });
            }
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }

    /// Writes to a temp file first and renames it over the old document.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        let body = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;

        fs::create_dir_all(dir).await.map_err(io_err)?;
        let target = Self::path_for(dir, key);
        let tmp = dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, body).await.map_err(io_err)?;
        fs::rename(&tmp, &target).await.map_err(io_err)?;
        Ok(())
    }
}
