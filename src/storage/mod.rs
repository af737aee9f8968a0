use crate::{config::ClientConfig, error::Result};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Key under which the session token is persisted
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Key under which the serialized session user is persisted
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Every key that makes up a persisted session
pub const SESSION_KEYS: [&str; 2] = [AUTH_TOKEN_KEY, CURRENT_USER_KEY];

/// Durable key-value storage for session credentials
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Reads a value, `None` if the key was never set or was removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Which backend persists the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            _ => Err(format!(
                "Invalid storage backend '{}'. Valid backends: memory, file, sqlite",
                s
            )),
        }
    }
}

/// Opens the session storage selected by `config`
pub fn open(config: &ClientConfig) -> Result<Arc<dyn SessionStorage>> {
    match config.storage_backend {
        StorageBackend::Memory => Ok(Arc::new(memory_storage::MemorySessionStorage::new())),
        #[cfg(feature = "file-storage")]
        StorageBackend::File => Ok(Arc::new(file_storage::FileSessionStorage::new(
            &config.session_file,
        ))),
        #[cfg(feature = "sqlite-storage")]
        StorageBackend::Sqlite => Ok(Arc::new(sqlite_storage::SqliteSessionStorage::open(
            &config.session_file,
        )?)),
        #[allow(unreachable_patterns)]
        other => Err(crate::error::TaskboardError::Config(format!(
            "Storage backend {:?} is not enabled in this build",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("FILE".parse::<StorageBackend>(), Ok(StorageBackend::File));
        assert_eq!("sqlite".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let config = ClientConfig {
            storage_backend: StorageBackend::Memory,
            ..ClientConfig::default()
        };

        let storage = open(&config).unwrap();
        storage.set(AUTH_TOKEN_KEY, "abc").await.unwrap();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(), Some("abc"));
    }
}
