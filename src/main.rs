// src/main.rs
use std::sync::Arc;

use cartonize::api;
use cartonize::catalog::{ContainerCatalog, FileCatalog, HttpCatalog, StaticCatalog};
use cartonize::config::{AppConfig, CatalogSource};
use cartonize::service::PackagingService;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let sizing_config = app_config.sizing.sizing_config();

    let catalog: Arc<dyn ContainerCatalog> = match app_config.catalog.source() {
        CatalogSource::Http { url, timeout } => match HttpCatalog::new(url.clone(), *timeout) {
            Ok(catalog) => Arc::new(catalog),
            Err(err) => {
                error!("❌ Could not create catalog client for {}: {}", url, err);
                return;
            }
        },
        CatalogSource::File(path) => Arc::new(FileCatalog::new(path.clone())),
        CatalogSource::Empty => {
            info!("ℹ️ No catalog configured; all quotes use the synthesized default packaging.");
            Arc::new(StaticCatalog::empty())
        }
    };

    info!("🚀 Packaging service starting with {}", catalog.describe());
    let service = PackagingService::new(catalog, sizing_config);
    api::start_api_server(api_config, service).await;
}
