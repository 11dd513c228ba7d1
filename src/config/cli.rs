use super::{RejectedUploadPolicy, ReleaseConfig, StorageSettings, UploadErrorPolicy};
use crate::error::ReleaseError;
use clap::Parser;
use clap::builder::BoolishValueParser;
use std::path::PathBuf;

/// Promote a built frontend from the artifact bucket to an environment's live bucket.
#[derive(Debug, Parser)]
#[command(name = "frontend-release", version, about)]
pub struct Cli {
    /// Deployment environment name
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Rollbar token used to register source maps
    #[arg(
        long,
        env = "FRONTEND_ROLLBAR_SERVER_ITEM_ACCESS_TOKEN",
        hide_env_values = true
    )]
    pub rollbar_token: Option<String>,

    /// Version label of the artifact to release
    #[arg(long, env = "RELEASE_VERSION", default_value = super::DEFAULT_VERSION)]
    pub release_version: String,

    /// Copy minified source maps into the live bucket
    #[arg(
        long,
        env = "DEPLOY_SOURCE_MAPS",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub deploy_source_maps: bool,

    /// Local directory source maps are staged in before upload
    #[arg(long, env = "SOURCE_MAP_STAGING_DIR", default_value = super::DEFAULT_STAGING_DIR)]
    pub staging_dir: PathBuf,

    #[arg(long, env = "ROLLBAR_SOURCE_MAP_ENDPOINT", default_value = super::DEFAULT_SOURCE_MAP_ENDPOINT)]
    pub source_map_endpoint: String,

    /// Policy for a non-success response from the source map endpoint
    #[arg(long, value_enum, default_value_t = RejectedUploadPolicy::Log)]
    pub on_rejected_upload: RejectedUploadPolicy,

    /// Policy for a source map that cannot be downloaded or sent
    #[arg(long, value_enum, default_value_t = UploadErrorPolicy::Abort)]
    pub on_upload_error: UploadErrorPolicy,

    #[arg(long, env = "S3_ENDPOINT_URL")]
    pub s3_endpoint: Option<String>,

    #[arg(long, env = "S3_REGION")]
    pub s3_region: Option<String>,

    #[arg(
        long,
        env = "S3_FORCE_PATH_STYLE",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub s3_force_path_style: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<ReleaseConfig, ReleaseError> {
        let mut config = ReleaseConfig::new(self.environment, self.rollbar_token)?;
        config.version = self.release_version;
        config.deploy_source_maps = self.deploy_source_maps;
        config.staging_dir = self.staging_dir;
        config.source_map_endpoint = self.source_map_endpoint;
        config.on_rejected_upload = self.on_rejected_upload;
        config.on_upload_error = self.on_upload_error;
        config.storage = StorageSettings {
            endpoint_url: self.s3_endpoint,
            region: self.s3_region,
            force_path_style: self.s3_force_path_style,
        };
        Ok(config)
    }
}
