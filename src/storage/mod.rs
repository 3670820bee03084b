//! Persistence backends
//!
//! `DATABASE_URL=memory` selects the in-memory stores; anything else is
//! treated as an SQLite URL.

mod sqlite;

use std::sync::Arc;

use tracing::info;

pub use sqlite::SqliteStorage;

use crate::{
    auth::storage::{MemoryUserStorage, UserStorage},
    config::StorageConfig,
    contacts::storage::{ContactStorage, MemoryContactStorage},
    errors::ApiError,
};

/// `DATABASE_URL` value selecting the in-memory backends
pub const MEMORY_URL: &str = "memory";

/// The stores a server runs on
#[derive(Clone)]
pub struct StorageBackends {
    pub users: Arc<dyn UserStorage>,
    pub contacts: Arc<dyn ContactStorage>,
}

impl StorageBackends {
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStorage::new()),
            contacts: Arc::new(MemoryContactStorage::new()),
        }
    }
}

/// Open the backends selected by `config`
pub async fn connect(config: &StorageConfig) -> Result<StorageBackends, ApiError> {
    if config.database_url == MEMORY_URL {
        info!("using in-memory storage");
        return Ok(StorageBackends::memory());
    }

    let storage = Arc::new(SqliteStorage::connect(&config.database_url, config.max_connections).await?);
    Ok(StorageBackends {
        users: storage.clone(),
        contacts: storage,
    })
}
