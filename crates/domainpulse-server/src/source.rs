use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use domainpulse_core::source::{store_from_csv, RecordSource};
use domainpulse_core::store::RecordStore;

/// Loads snapshots from the dashboard's CSV export on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }

    async fn load(&self) -> anyhow::Result<RecordStore> {
        let path = self.path.clone();
        // File read and parse are blocking; keep them off the runtime workers.
        tokio::task::spawn_blocking(move || -> anyhow::Result<RecordStore> {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            store_from_csv(&bytes).with_context(|| format!("parsing {}", path.display()))
        })
        .await
        .map_err(|e| anyhow::anyhow!("csv load task join failed: {e}"))?
    }
}
