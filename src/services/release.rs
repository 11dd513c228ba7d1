use crate::config::{RejectedUploadPolicy, ReleaseConfig, UploadErrorPolicy};
use crate::error::ReleaseError;
use crate::services::source_maps::{SourceMapUpload, SourceMapUploader, UploadResponse};
use crate::services::storage::StorageService;
use crate::utils::keys;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub assets_copied: usize,
    pub pages_copied: usize,
    /// Source maps held back because `deploy_source_maps` is off
    pub skipped: usize,
    pub source_maps_uploaded: usize,
    /// Uploads answered with a non-success status (only under the log policy)
    pub source_maps_rejected: usize,
    /// Uploads that could not be completed (only under the skip policy)
    pub source_maps_failed: usize,
}

/// Promotes one version of the frontend into an environment's live bucket.
///
/// The release runs as two strictly ordered phases: assets first, so new
/// versioned bundles exist before the pages that reference them are replaced.
pub struct ReleaseOrchestrator {
    config: ReleaseConfig,
    storage: Arc<dyn StorageService>,
    uploader: Arc<dyn SourceMapUploader>,
}

impl ReleaseOrchestrator {
    pub fn new(
        config: ReleaseConfig,
        storage: Arc<dyn StorageService>,
        uploader: Arc<dyn SourceMapUploader>,
    ) -> Self {
        Self {
            config,
            storage,
            uploader,
        }
    }

    pub async fn run(&self) -> Result<ReleaseSummary, ReleaseError> {
        let mut summary = ReleaseSummary::default();

        self.copy_assets(&mut summary).await?;
        self.copy_pages(&mut summary).await?;

        info!(
            "... {} of the frontend is now live in {}.",
            self.config.version, self.config.environment
        );
        Ok(summary)
    }

    /// Copies everything under the assets prefix to `assets/` and registers
    /// each minified JS source map with the monitoring service.
    pub async fn copy_assets(&self, summary: &mut ReleaseSummary) -> Result<(), ReleaseError> {
        let source_bucket = self.config.source_bucket();
        let dest_bucket = self.config.dest_bucket();
        let assets_prefix = self.config.assets_prefix();
        let base_url = self.config.base_url();

        info!(
            "Copying frontend resources from {}{} to {} ...",
            source_bucket, assets_prefix, dest_bucket
        );

        let objects = self
            .storage
            .list_objects(source_bucket, &assets_prefix)
            .await
            .map_err(|e| ReleaseError::storage(assets_prefix.as_str(), e))?;

        for key in objects {
            let new_key = keys::asset_dest_key(&key, &assets_prefix);

            if keys::is_source_map(&key) && !self.config.deploy_source_maps {
                info!(
                    "Skipping file {}, DEPLOY_SOURCE_MAPS={}",
                    key, self.config.deploy_source_maps
                );
                summary.skipped += 1;
            } else {
                self.copy(&key, &dest_bucket, &new_key).await?;
                summary.assets_copied += 1;
            }

            // Registration does not depend on deploy_source_maps: a map kept out
            // of the live bucket is still sent to the monitoring service.
            if keys::is_js_source_map(&key) {
                let minified_url = keys::minified_url(&base_url, &new_key);
                match self.upload_source_map(&minified_url, &key).await {
                    Ok(response) if response.is_success() => summary.source_maps_uploaded += 1,
                    Ok(_) => summary.source_maps_rejected += 1,
                    Err(e @ ReleaseError::SourceMapRejected { .. }) => return Err(e),
                    Err(e) if self.config.on_upload_error == UploadErrorPolicy::Skip => {
                        error!("An error occurred uploading JS source map {}: {}", new_key, e);
                        summary.source_maps_failed += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    /// Copies the remaining objects of the version to the bucket root,
    /// skipping anything the assets phase already handled.
    pub async fn copy_pages(&self, summary: &mut ReleaseSummary) -> Result<(), ReleaseError> {
        let source_bucket = self.config.source_bucket();
        let dest_bucket = self.config.dest_bucket();
        let assets_prefix = self.config.assets_prefix();
        let version_prefix = self.config.version_prefix();

        info!(
            "Copying frontend resources from {}{} to {} ...",
            source_bucket, version_prefix, dest_bucket
        );

        let objects = self
            .storage
            .list_objects(source_bucket, &version_prefix)
            .await
            .map_err(|e| ReleaseError::storage(version_prefix.as_str(), e))?;

        for key in objects {
            if key.starts_with(&assets_prefix) {
                continue;
            }

            let new_key = keys::page_dest_key(&key, &version_prefix);
            self.copy(&key, &dest_bucket, &new_key).await?;
            summary.pages_copied += 1;
        }

        Ok(())
    }

    /// Stages `source_map_key` locally and posts it to the source map endpoint.
    pub async fn upload_source_map(
        &self,
        minified_url: &str,
        source_map_key: &str,
    ) -> Result<UploadResponse, ReleaseError> {
        let source_map_path = keys::staging_path(&self.config.staging_dir, source_map_key);
        let staging_parent = source_map_path
            .parent()
            .unwrap_or(self.config.staging_dir.as_path());
        tokio::fs::create_dir_all(staging_parent).await?;
        self.storage
            .download_to_file(self.config.source_bucket(), source_map_key, &source_map_path)
            .await
            .map_err(|e| ReleaseError::storage(source_map_key, e))?;

        let request = SourceMapUpload {
            access_token: self.config.rollbar_token.clone(),
            version: self.config.version.clone(),
            minified_url: minified_url.to_string(),
            source_map_path,
        };

        let response = self.uploader.upload(&request).await.map_err(|e| {
            ReleaseError::SourceMapUpload {
                key: source_map_key.to_string(),
                source: e,
            }
        })?;

        info!(
            "--> Response from {} source map upload: {}",
            source_map_key, response.body
        );

        if !response.is_success() {
            match self.config.on_rejected_upload {
                RejectedUploadPolicy::Log => {
                    warn!(
                        "Source map upload for {} returned status {}",
                        source_map_key, response.status
                    );
                }
                RejectedUploadPolicy::Fail => {
                    return Err(ReleaseError::SourceMapRejected {
                        key: source_map_key.to_string(),
                        status: response.status,
                        body: response.body,
                    });
                }
            }
        }

        Ok(response)
    }

    async fn copy(&self, key: &str, dest_bucket: &str, new_key: &str) -> Result<(), ReleaseError> {
        self.storage
            .copy_object(self.config.source_bucket(), key, dest_bucket, new_key)
            .await
            .map_err(|e| ReleaseError::storage(key, e))?;
        info!("--> '{}' to '{}'", key, new_key);
        Ok(())
    }
}
