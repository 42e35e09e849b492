//! Bucket versioning. S3 has no delete API for it: once enabled a bucket
//! can only be suspended.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::late_init::late_init;
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use rustack_s3_model::Bucket;
use rustack_s3_model::types::{MfaDeleteStatus, VersioningConfiguration};

use super::{bucket_name, params, params_mut};
use crate::api::BucketApi;

const ERR_GET: &str = "cannot get bucket versioning";
const ERR_PUT: &str = "cannot put bucket versioning";

/// Reconciles `versioningConfiguration`.
#[derive(Debug)]
pub struct VersioningClient {
    api: Arc<dyn BucketApi>,
}

impl VersioningClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }
}

fn matches(desired: &VersioningConfiguration, observed: &VersioningConfiguration) -> bool {
    let mfa = |c: &VersioningConfiguration| c.mfa_delete.unwrap_or(MfaDeleteStatus::Disabled);
    desired.status == observed.status && mfa(desired) == mfa(observed)
}

#[async_trait]
impl Subresource<Bucket> for VersioningClient {
    fn name(&self) -> &'static str {
        "versioning"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self
            .api
            .get_bucket_versioning(bucket_name(bucket))
            .await
            .map_err(|e| ProviderError::api(ERR_GET, e))?;
        Ok(match &params(bucket).versioning_configuration {
            Some(desired) if !matches(desired, &observed) => ResourceStatus::NeedsUpdate,
            _ => ResourceStatus::Updated,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).versioning_configuration else {
            return Ok(());
        };
        self.api
            .put_bucket_versioning(bucket_name(bucket), desired)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let observed = self
            .api
            .get_bucket_versioning(bucket_name(bucket))
            .await
            .map_err(|e| ProviderError::api(ERR_GET, e))?;
        if observed.status.is_none() {
            return Ok(());
        }
        let desired = params_mut(bucket)
            .versioning_configuration
            .get_or_insert_with(VersioningConfiguration::default);
        late_init(&mut desired.status, observed.status.as_ref());
        late_init(&mut desired.mfa_delete, observed.mfa_delete.as_ref());
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).versioning_configuration.is_some()
    }
}
