use clap::Parser;
use dotenvy::dotenv;
use helium_frontend_release::config::Cli;
use helium_frontend_release::infrastructure::{source_maps, storage};
use helium_frontend_release::ReleaseOrchestrator;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helium_frontend_release=info,frontend_release=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Nothing is touched until both required values are present. The line is
    // printed directly so RUST_LOG cannot suppress it.
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            println!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "🚀 Releasing {} of the frontend to {} (source maps deployed: {})",
        config.version, config.environment, config.deploy_source_maps
    );

    let storage_service = storage::setup_storage(&config.storage).await;
    let uploader = source_maps::setup_uploader(&config.source_map_endpoint)?;

    let orchestrator = ReleaseOrchestrator::new(config, storage_service, uploader);
    let summary = orchestrator.run().await?;

    info!(
        "✅ Copied {} assets and {} pages, registered {} source maps ({} rejected, {} failed, {} skipped)",
        summary.assets_copied,
        summary.pages_copied,
        summary.source_maps_uploaded,
        summary.source_maps_rejected,
        summary.source_maps_failed,
        summary.skipped
    );
    Ok(())
}
