//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::opf::OpfStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: OpfStore,
    db: SqlitePool,
}

impl AppState {
    pub fn new(config: Config, store: OpfStore, db: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store, db }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the OPF store
    pub fn store(&self) -> &OpfStore {
        &self.inner.store
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }
}
