use std::future::Future;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ApiError;

/// Destination for dump archives.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// S3 (or S3-compatible) bucket storage.
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    region: String,
}

impl S3Store {
    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        let (Some(access), Some(secret)) = (cfg.s3_access_key.as_ref(), cfg.s3_secret_key.as_ref())
        else {
            return Err(ApiError::Upload(
                "s3_access_key and s3_secret_key must be configured".to_string(),
            ));
        };
        let credentials = Credentials::new(access, secret, None, None, "mysqlapi-config");
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.s3_region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = cfg.s3_endpoint.as_ref() {
            builder = builder.endpoint_url(endpoint.as_str()).force_path_style(true);
        }
        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            region: cfg.s3_region.clone(),
        })
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), ApiError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        // us-east-1 rejects an explicit location constraint.
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        match request.send().await {
            Ok(_) => {
                info!(bucket, "bucket created");
                Ok(())
            }
            Err(e)
                if e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                }) =>
            {
                debug!(bucket, "bucket already present");
                Ok(())
            }
            Err(e) => Err(ApiError::Upload(DisplayErrorContext(&e).to_string())),
        }
    }
}

impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ApiError> {
        self.ensure_bucket(bucket).await?;
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| ApiError::Upload(DisplayErrorContext(&e).to_string()))?;
        info!(bucket, key, size, "object uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_store_requires_keys() {
        let err = S3Store::from_config(&Config::default()).err().expect("missing keys");
        assert!(matches!(err, ApiError::Upload(_)));
    }
}
