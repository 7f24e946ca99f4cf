use async_trait::async_trait;

use crate::error::IngestError;
use crate::ingest::{fingerprint, parse_csv};
use crate::record::MetricRow;
use crate::store::RecordStore;

/// Where snapshots come from.
///
/// Implementations build a complete [`RecordStore`] or fail; they never hand
/// back a partially loaded dataset.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// Short description used in logs.
    fn describe(&self) -> String;

    async fn load(&self) -> anyhow::Result<RecordStore>;
}

/// Build a snapshot from raw CSV export bytes.
pub fn store_from_csv(bytes: &[u8]) -> Result<RecordStore, IngestError> {
    let rows = parse_csv(bytes)?;
    tracing::debug!(rows = rows.len(), bytes = bytes.len(), "Parsed CSV export");
    Ok(RecordStore::new(rows, fingerprint(bytes)))
}

/// Fixed in-memory rows.
#[derive(Debug, Clone)]
pub struct StaticSource {
    rows: Vec<MetricRow>,
}

impl StaticSource {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn describe(&self) -> String {
        format!("static ({} rows)", self.rows.len())
    }

    async fn load(&self) -> anyhow::Result<RecordStore> {
        let encoded = serde_json::to_vec(&self.rows)?;
        Ok(RecordStore::new(self.rows.clone(), fingerprint(&encoded)))
    }
}
