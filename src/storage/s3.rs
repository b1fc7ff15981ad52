//! S3-compatible publisher
//!
//! Uploads with `PutObject` and hands back a presigned GET URL, so the bucket
//! itself can stay private.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Builder as ConfigBuilder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

use crate::storage::publisher::{PublishError, Publisher, content_type_for};

/// Connection details for the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSettings {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    /// Lifetime of the returned presigned URLs
    pub url_expiry: Duration,
}

pub struct S3Publisher {
    client: Client,
    url_expiry: Duration,
}

impl S3Publisher {
    pub fn new(settings: &BucketSettings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "speedtest-reporter",
        );

        let config = ConfigBuilder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&settings.endpoint_url)
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(config),
            url_expiry: settings.url_expiry,
        }
    }
}

#[async_trait]
impl Publisher for S3Publisher {
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        remote_key: &str,
    ) -> Result<String, PublishError> {
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| PublishError::Read {
                path: local_path.to_path_buf(),
                source,
            })?;
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(remote_key)
            .content_type(content_type_for(local_path))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| PublishError::Upload {
                bucket: bucket.to_string(),
                key: remote_key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        debug!("Stored {size} bytes as {bucket}/{remote_key}");

        let presigning =
            PresigningConfig::expires_in(self.url_expiry).map_err(|e| PublishError::Locator {
                key: remote_key.to_string(),
                message: e.to_string(),
            })?;
        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(remote_key)
            .presigned(presigning)
            .await
            .map_err(|e| PublishError::Locator {
                key: remote_key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!("Published {bucket}/{remote_key}");
        Ok(presigned.uri().to_string())
    }
}
