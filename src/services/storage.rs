use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::Path;

/// Characters left as-is in an `x-amz-copy-source` header.
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Every key under `prefix`, in the order the store returns them.
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<()>;
    async fn download_to_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;
}

pub struct S3StorageService {
    client: Client,
}

impl S3StorageService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, COPY_SOURCE))
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await?;

            if let Some(contents) = res.contents {
                for object in contents {
                    if let Some(key) = object.key {
                        objects.push(key);
                    }
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<()> {
        let res = self
            .client
            .copy_object()
            .bucket(dest_bucket)
            .copy_source(copy_source(source_bucket, source_key))
            .key(dest_key)
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 copy_object failed: source={}/{}, dest={}/{}, error={:?}",
                source_bucket,
                source_key,
                dest_bucket,
                dest_key,
                e
            );
            return Err(e.into());
        }
        Ok(())
    }

    async fn download_to_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let res = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        let data = res.body.collect().await?.into_bytes();
        tokio::fs::write(path, &data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_keeps_separators() {
        assert_eq!(
            copy_source("heliumedu", "helium/frontend/latest/index.html"),
            "heliumedu/helium/frontend/latest/index.html"
        );
    }

    #[test]
    fn test_copy_source_encodes_special_characters() {
        assert_eq!(
            copy_source("heliumedu", "helium/frontend/latest/my page+1.html"),
            "heliumedu/helium/frontend/latest/my%20page%2B1.html"
        );
    }
}
