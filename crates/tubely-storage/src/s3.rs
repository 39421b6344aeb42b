use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    cdn_base_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials come from the standard `AWS_*` environment variables.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an existing object store. Tests pass `object_store::memory::InMemory`.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            cdn_base_url: None,
        }
    }

    /// Serve playback URLs from a distribution in front of the bucket.
    pub fn with_cdn_base_url(mut self, cdn_base_url: Option<String>) -> Self {
        self.cdn_base_url = cdn_base_url;
        self
    }

    /// Generate public URL for S3 object
    ///
    /// A configured CDN base wins. Otherwise AWS uses
    /// https://{bucket}.s3.{region}.amazonaws.com/{key} and S3-compatible
    /// providers use path-style {endpoint}/{bucket}/{key}.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref cdn) = self.cdn_base_url {
            format!("{}/{}", cdn.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    async fn stream_file(
        &self,
        location: ObjectPath,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        let mut file = tokio::fs::File::open(path).await?;

        let attributes = Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        )]);
        let mut writer = BufWriter::new(Arc::clone(&self.store), location).with_attributes(attributes);

        let copied = tokio::io::copy(&mut file, &mut writer).await;
        let result = match copied {
            Ok(size) => writer.shutdown().await.map(|_| size),
            Err(e) => Err(e),
        };

        match result {
            Ok(size) => Ok(size),
            Err(e) => {
                // Drop any multipart upload that was started.
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(error = %abort_err, "Failed to abort S3 upload");
                }
                Err(StorageError::UploadFailed(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        if storage_key.is_empty() || storage_key.starts_with('/') || storage_key.contains("..") {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        let location = ObjectPath::from(storage_key);
        let start = std::time::Instant::now();

        let size = self
            .stream_file(location, path, content_type)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                e
            })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }
}
