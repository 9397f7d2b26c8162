use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{Config, DEFAULT_SERVICE_HOST};
use crate::error::ApiError;
use crate::service::dump::DumpExporter;
use crate::service::storage::ObjectStore;

/// Object key a full dump taken at `at` is stored under.
pub fn dump_key(at: DateTime<Utc>) -> String {
    format!("mysqlapi-dump-{}.sql", at.format("%Y%m%dT%H%M%SZ"))
}

/// Dumps every schema on the instance and ships the result to object storage.
pub struct ExportJob<S> {
    exporter: DumpExporter,
    store: S,
    bucket: String,
}

impl<S: ObjectStore> ExportJob<S> {
    pub fn new(exporter: DumpExporter, store: S, bucket: impl Into<String>) -> Self {
        Self {
            exporter,
            store,
            bucket: bucket.into(),
        }
    }

    pub fn from_config(cfg: &Config, store: S) -> Result<Self, ApiError> {
        let bucket = cfg
            .s3_bucket
            .clone()
            .ok_or_else(|| ApiError::Upload("s3_bucket must be configured".to_string()))?;
        let exporter = DumpExporter::new(
            cfg.mysqldump_path.clone(),
            cfg.connection_settings(DEFAULT_SERVICE_HOST),
        );
        Ok(Self::new(exporter, store, bucket))
    }

    /// Returns the key the dump was stored under.
    pub async fn run(&self) -> Result<String, ApiError> {
        let data = self.exporter.export_all().await?;
        let key = dump_key(Utc::now());
        let size = data.len();
        self.store.put(&self.bucket, &key, data).await?;
        info!(bucket = %self.bucket, key = %key, size, "full dump exported");
        Ok(key)
    }
}
