//! Transfer acceleration.
//!
//! Acceleration is unavailable in some regions and on some S3-compatible
//! endpoints. Those answer with `MethodNotAllowed`, `UnsupportedArgument` or
//! `NotImplemented`; the bucket cannot be reconciled there, which is not
//! drift, so observe reports `Updated`.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use rustack_s3_model::types::{AccelerateConfiguration, BucketAccelerateStatus};
use rustack_s3_model::{Bucket, S3Error, S3ErrorCode};
use tracing::debug;

use super::{bucket_name, params, params_mut};
use crate::api::BucketApi;

const ERR_GET: &str = "cannot get bucket accelerate configuration";
const ERR_PUT: &str = "cannot put bucket accelerate configuration";

/// Reconciles `accelerateConfiguration`.
#[derive(Debug)]
pub struct AccelerationClient {
    api: Arc<dyn BucketApi>,
}

impl AccelerationClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    /// `None` when acceleration is not supported for this bucket.
    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<Option<AccelerateConfiguration>> {
        match self.api.get_bucket_accelerate_configuration(bucket_name(bucket)).await {
            Ok(config) => Ok(Some(config)),
            Err(err) if is_unsupported(&err) => {
                debug!(bucket = bucket_name(bucket), code = %err.code, "acceleration unsupported");
                Ok(None)
            }
            Err(err) => Err(ProviderError::api(ERR_GET, err)),
        }
    }
}

fn is_unsupported(err: &S3Error) -> bool {
    matches!(
        err.code,
        S3ErrorCode::MethodNotAllowed
            | S3ErrorCode::UnsupportedArgument
            | S3ErrorCode::NotImplemented
    )
}

fn status(config: &AccelerateConfiguration) -> BucketAccelerateStatus {
    config.status.unwrap_or(BucketAccelerateStatus::Suspended)
}

#[async_trait]
impl Subresource<Bucket> for AccelerationClient {
    fn name(&self) -> &'static str {
        "acceleration"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let Some(observed) = self.fetch(bucket).await? else {
            return Ok(ResourceStatus::Updated);
        };
        Ok(match &params(bucket).accelerate_configuration {
            Some(desired) if status(desired) != status(&observed) => ResourceStatus::NeedsUpdate,
            _ => ResourceStatus::Updated,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).accelerate_configuration else {
            return Ok(());
        };
        self.api
            .put_bucket_accelerate_configuration(bucket_name(bucket), desired)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let Some(observed) = self.fetch(bucket).await? else {
            return Ok(());
        };
        let Some(observed_status) = observed.status else {
            return Ok(());
        };
        let desired = params_mut(bucket)
            .accelerate_configuration
            .get_or_insert_with(AccelerateConfiguration::default);
        desired.status.get_or_insert(observed_status);
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).accelerate_configuration.is_some()
    }
}
