//! S3-compatible object storage client.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Public HTTPS host for objects, also the interop S3 endpoint.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

/// Configuration for the storage client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 API endpoint
    pub endpoint_url: String,
    /// Access key ID (HMAC key for GCS interop)
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket that receives job output
    pub bucket_name: String,
    /// Region ("auto" for GCS interop and R2)
    pub region: String,
    /// Base of the public object URL (`<base>/<bucket>/<key>`)
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()),
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("STORAGE_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("STORAGE_BUCKET_NAME not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()),
        })
    }
}

/// Object storage client for job output.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl StorageClient {
    /// Create a new storage client from configuration.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "mediajob",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            public_base_url: config.public_base_url,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = StorageConfig::from_env()?;
        Self::new(config).await
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of `key` in this client's bucket.
    pub fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, &self.bucket, key)
    }

    /// Upload a file and mark it publicly readable; returns its public URL.
    pub async fn upload_public_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}/{}", path.display(), self.bucket, key);
        Ok(self.public_url(key))
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("Storage connectivity check failed: {}", e)))?;
        Ok(())
    }
}

/// `<base>/<bucket>/<key>` with exactly one slash at each join.
pub fn public_object_url(base: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket.trim_matches('/'),
        key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_object_url() {
        assert_eq!(
            public_object_url("https://storage.googleapis.com/", "out", "merged/a.mp4"),
            "https://storage.googleapis.com/out/merged/a.mp4"
        );
        assert_eq!(
            public_object_url("https://cdn.example.com", "/out/", "/merged/a.mp4"),
            "https://cdn.example.com/out/merged/a.mp4"
        );
    }

    #[tokio::test]
    async fn test_client_public_url() {
        let client = StorageClient::new(StorageConfig {
            endpoint_url: "http://127.0.0.1:9000".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "results".to_string(),
            region: "auto".to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        })
        .await
        .unwrap();

        assert_eq!(client.bucket(), "results");
        assert_eq!(
            client.public_url("merged/x.mp4"),
            "https://storage.googleapis.com/results/merged/x.mp4"
        );
    }
}
