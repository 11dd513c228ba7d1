use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;

/// One source map registration, built per object and dropped after the call.
#[derive(Clone)]
pub struct SourceMapUpload {
    pub access_token: String,
    pub version: String,
    /// Public URL the minified bundle is served from
    pub minified_url: String,
    /// Staged copy of the `.map` file
    pub source_map_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait SourceMapUploader: Send + Sync {
    async fn upload(&self, request: &SourceMapUpload) -> Result<UploadResponse>;
}

/// Registers source maps with Rollbar's `/api/1/sourcemap` endpoint.
pub struct RollbarUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl RollbarUploader {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl SourceMapUploader for RollbarUploader {
    async fn upload(&self, request: &SourceMapUpload) -> Result<UploadResponse> {
        let data = tokio::fs::read(&request.source_map_path).await?;
        let file_name = request
            .source_map_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source_map".to_string());

        let form = Form::new()
            .text("access_token", request.access_token.clone())
            .text("version", request.version.clone())
            .text("minified_url", request.minified_url.clone())
            .part("source_map", Part::bytes(data).file_name(file_name));

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!("Source map endpoint answered {}", status);

        Ok(UploadResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_success_range() {
        let ok = UploadResponse {
            status: 200,
            body: String::new(),
        };
        let rejected = UploadResponse {
            status: 422,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!rejected.is_success());
    }
}
