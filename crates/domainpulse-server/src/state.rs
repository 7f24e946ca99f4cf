use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use domainpulse_core::{config::Config, source::RecordSource, store::RecordStore};

use crate::error::AppError;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Where reloads read from.
    pub source: Arc<dyn RecordSource>,

    /// Current snapshot. Readers clone the `Arc` and release the lock before
    /// computing; a reload swaps in a fully built store.
    snapshot: Arc<RwLock<Arc<RecordStore>>>,

    /// Serialises reloads so two loads never race to swap.
    reload_lock: Arc<Mutex<()>>,
}

/// Summary of a successful reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub rows: usize,
    pub data_version: String,
}

impl AppState {
    /// Construct state serving `initial` until the first reload.
    pub fn new(config: Config, source: Arc<dyn RecordSource>, initial: RecordStore) -> Self {
        Self {
            config: Arc::new(config),
            source,
            snapshot: Arc::new(RwLock::new(Arc::new(initial))),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load from `source` once; on failure start empty and log a warning so the
    /// server still comes up.
    pub async fn bootstrap(config: Config, source: Arc<dyn RecordSource>) -> Self {
        let initial = match source.load().await {
            Ok(store) => {
                info!(
                    source = %source.describe(),
                    rows = store.len(),
                    data_version = %store.fingerprint(),
                    "Snapshot loaded"
                );
                store
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.describe(),
                    error = %e,
                    "Initial load failed, starting with no data"
                );
                RecordStore::empty()
            }
        };
        Self::new(config, source, initial)
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Arc<RecordStore> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Rebuild the snapshot from the source. The previous snapshot keeps
    /// serving if the load fails.
    pub async fn reload(&self) -> Result<ReloadOutcome, AppError> {
        let _guard = self.reload_lock.lock().await;

        let store = match self.source.load().await {
            Ok(store) => store,
            Err(e) => {
                error!(source = %self.source.describe(), error = %e, "Reload failed");
                return Err(AppError::ReloadFailed(format!("{e:#}")));
            }
        };

        let outcome = ReloadOutcome {
            rows: store.len(),
            data_version: store.fingerprint().to_string(),
        };
        *self.snapshot.write().await = Arc::new(store);
        info!(
            rows = outcome.rows,
            data_version = %outcome.data_version,
            "Snapshot reloaded"
        );
        Ok(outcome)
    }
}
