pub mod cli;

use crate::error::ReleaseError;
use std::fmt;
use std::path::PathBuf;

pub use cli::Cli;

pub const SOURCE_BUCKET: &str = "heliumedu";
pub const KEY_NAMESPACE: &str = "helium";
pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_STAGING_DIR: &str = "source_maps";
pub const DEFAULT_SOURCE_MAP_ENDPOINT: &str = "https://api.rollbar.com/api/1/sourcemap";

/// What to do when the source-map endpoint answers with a non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RejectedUploadPolicy {
    /// Print the response body and carry on
    #[default]
    Log,
    /// Abort the release
    Fail,
}

/// What to do when staging or sending a source map fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UploadErrorPolicy {
    /// Abort the release
    #[default]
    Abort,
    /// Log the failure and continue with the next object
    Skip,
}

/// Explicit settings for the object storage client
#[derive(Debug, Clone, Default)]
pub struct StorageSettings {
    /// Custom endpoint, for S3-compatible stores (default: AWS)
    pub endpoint_url: Option<String>,
    /// Region override (default: resolved from the AWS environment)
    pub region: Option<String>,
    pub force_path_style: bool,
}

/// Everything a single release run needs
#[derive(Clone)]
pub struct ReleaseConfig {
    /// Deployment environment name, e.g. "staging" or "prod"
    pub environment: String,

    /// Rollbar `post_server_item` token used for source map uploads
    pub rollbar_token: String,

    /// Version label of the artifact to promote (default: "latest")
    pub version: String,

    /// Copy `.min.js.map` and `.min.css.map` files to the live bucket (default: true)
    pub deploy_source_maps: bool,

    /// Directory source maps are downloaded into before upload (default: "source_maps")
    pub staging_dir: PathBuf,

    pub source_map_endpoint: String,

    pub on_rejected_upload: RejectedUploadPolicy,

    pub on_upload_error: UploadErrorPolicy,

    pub storage: StorageSettings,
}

impl ReleaseConfig {
    /// Validates the two required values and fills everything else with defaults.
    pub fn new(
        environment: Option<String>,
        rollbar_token: Option<String>,
    ) -> Result<Self, ReleaseError> {
        let environment = environment.filter(|v| !v.is_empty());
        let rollbar_token = rollbar_token.filter(|v| !v.is_empty());

        match (environment, rollbar_token) {
            (Some(environment), Some(rollbar_token)) => Ok(Self {
                environment,
                rollbar_token,
                version: DEFAULT_VERSION.to_string(),
                deploy_source_maps: true,
                staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
                source_map_endpoint: DEFAULT_SOURCE_MAP_ENDPOINT.to_string(),
                on_rejected_upload: RejectedUploadPolicy::default(),
                on_upload_error: UploadErrorPolicy::default(),
                storage: StorageSettings::default(),
            }),
            _ => Err(ReleaseError::MissingConfig),
        }
    }

    pub fn source_bucket(&self) -> &str {
        SOURCE_BUCKET
    }

    pub fn dest_bucket(&self) -> String {
        format!("heliumedu.{}.frontend.static", self.environment)
    }

    /// Production serves from the bare domain, every other environment from a subdomain.
    pub fn base_url(&self) -> String {
        let env_segment = if self.environment.contains("prod") {
            String::new()
        } else {
            format!("{}.", self.environment)
        };
        format!("https://www.{}heliumedu.com", env_segment)
    }

    pub fn version_prefix(&self) -> String {
        format!("{}/frontend/{}", KEY_NAMESPACE, self.version)
    }

    pub fn assets_prefix(&self) -> String {
        format!("{}/assets", self.version_prefix())
    }
}

impl fmt::Debug for ReleaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseConfig")
            .field("environment", &self.environment)
            .field("rollbar_token", &"<redacted>")
            .field("version", &self.version)
            .field("deploy_source_maps", &self.deploy_source_maps)
            .field("staging_dir", &self.staging_dir)
            .field("source_map_endpoint", &self.source_map_endpoint)
            .field("on_rejected_upload", &self.on_rejected_upload)
            .field("on_upload_error", &self.on_upload_error)
            .field("storage", &self.storage)
            .finish()
    }
}
