//! Static website hosting.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params};
use crate::api::BucketApi;

const ERR_GET: &str = "cannot get bucket website";
const ERR_PUT: &str = "cannot put bucket website";
const ERR_DELETE: &str = "cannot delete bucket website configuration";

/// Reconciles `websiteConfiguration`.
#[derive(Debug)]
pub struct WebsiteClient {
    api: Arc<dyn BucketApi>,
}

impl WebsiteClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Subresource<Bucket> for WebsiteClient {
    fn name(&self) -> &'static str {
        "website"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = optional(
            self.api.get_bucket_website(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchWebsiteConfiguration,
            ERR_GET,
        )?;
        Ok(match (&params(bucket).website_configuration, observed) {
            (None, None) => ResourceStatus::Updated,
            (None, Some(_)) => ResourceStatus::NeedsDeletion,
            (Some(desired), Some(observed)) if *desired == observed => ResourceStatus::Updated,
            (Some(_), _) => ResourceStatus::NeedsUpdate,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).website_configuration else {
            return Ok(());
        };
        self.api
            .put_bucket_website(bucket_name(bucket), desired)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, _bucket: &mut Bucket) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).website_configuration.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for WebsiteClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        ignore_missing(
            self.api.delete_bucket_website(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchWebsiteConfiguration,
            ERR_DELETE,
        )
    }
}
