mod app;
mod clipboard;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};
use requi_core::{
    config::{self, AppConfig},
    Catalog, MetadataStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let metadata_store = MetadataStore::new(&config.metadata_path);
    let metadata = metadata_store
        .load()
        .context("metadata file exists but could not be parsed")?;

    // A missing or malformed catalog is fatal; the planner cannot run
    // without its data.
    let catalog = Catalog::load(&config.catalog_path, &metadata.personal_items)
        .with_context(|| {
            format!(
                "failed to load catalog {} (set catalog_path in {})",
                config.catalog_path.display(),
                config::config_file_path().display()
            )
        })?;

    let mut app = app::RequisitionApp::new(catalog, metadata_store, metadata);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("requi.log");

    let env_filter = EnvFilter::from_default_env();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
