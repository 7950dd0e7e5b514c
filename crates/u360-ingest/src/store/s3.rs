//! S3-backed [`ObjectStore`]

use super::{ObjectDescriptor, ObjectReader, ObjectStore};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tracing::{debug, info, instrument};

/// Connection settings for [`S3ObjectStore`].
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    pub region: Option<String>,
    /// Custom endpoint (MinIO, LocalStack); enables path-style addressing.
    pub endpoint: Option<String>,
}

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from the default AWS credential chain.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        let s3_config = if settings.endpoint.is_some() {
            builder.force_path_style(true).build()
        } else {
            builder.build()
        };

        info!(
            region = ?settings.region,
            endpoint = ?settings.endpoint,
            "S3 client initialized"
        );

        Self::from_client(Client::from_conf(s3_config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectDescriptor>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| IngestError::ObjectStore {
                bucket: bucket.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                // Skip directory markers
                if key.is_empty() || key.ends_with('/') {
                    continue;
                }
                let size = object.size().and_then(|s| u64::try_from(s).ok()).unwrap_or(0);
                objects.push(ObjectDescriptor::new(key, size));
            }

            debug!(page_objects = response.key_count().unwrap_or(0), total = objects.len(), "Listed page");

            if response.is_truncated() != Some(true) {
                break;
            }
            continuation_token = response.next_continuation_token().map(str::to_string);
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    #[instrument(skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| IngestError::Fetch {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(Box::pin(response.body.into_async_read()))
    }
}
