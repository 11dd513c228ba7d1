use crate::services::source_maps::RollbarUploader;
use std::sync::Arc;
use tracing::info;

pub fn setup_uploader(endpoint: &str) -> anyhow::Result<Arc<RollbarUploader>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("frontend-release/", env!("CARGO_PKG_VERSION")))
        .build()?;

    info!("🗺️  Source maps: {}", endpoint);
    Ok(Arc::new(RollbarUploader::new(client, endpoint.to_string())))
}
