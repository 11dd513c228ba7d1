use crate::config::StorageSettings;
use crate::services::storage::S3StorageService;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

/// Builds the S3 client from the ambient AWS environment plus explicit overrides.
pub async fn setup_storage(settings: &StorageSettings) -> Arc<S3StorageService> {
    let mut loader = aws_config::from_env();
    if let Some(endpoint_url) = &settings.endpoint_url {
        info!("☁️  S3 Storage: {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(settings.force_path_style)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    Arc::new(S3StorageService::new(s3_client))
}
