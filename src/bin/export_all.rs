//! Scheduled maintenance job: dump every schema and upload it to object storage.

use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mysqlapi::Config;
use mysqlapi::service::export_job::ExportJob;
use mysqlapi::service::storage::S3Store;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let store = S3Store::from_config(&cfg)?;
    let job = ExportJob::from_config(&cfg, store)?;

    match job.run().await {
        Ok(key) => {
            info!(key = %key, "export finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "export failed");
            Err(e.into())
        }
    }
}
