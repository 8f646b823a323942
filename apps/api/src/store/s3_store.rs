use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use super::{RemoteStore, StoreError};
use crate::config::S3Settings;

/// S3 / MinIO-backed store. Each key is one object in the configured bucket.
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn connect(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "pattern-api-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&settings.endpoint)
            .load()
            .await;

        Self {
            client: S3Client::new(&s3_config),
            bucket: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    async fn is_available(&self) -> Result<bool, StoreError> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(Bytes::new());
                }
                return Err(StoreError::Backend(format!("S3 get {key} failed: {e}")));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("S3 read {key} failed: {e}")))?;
        Ok(body.into_bytes())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(value))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| {
                if e.code() == Some("AccessDenied") {
                    StoreError::Rejected(format!("S3 put {key} denied"))
                } else {
                    StoreError::Backend(format!("S3 put {key} failed: {e}"))
                }
            })?;
        Ok(())
    }
}
