//! Requester-pays setting.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use rustack_s3_model::Bucket;
use rustack_s3_model::types::RequestPaymentConfiguration;

use super::{bucket_name, params, params_mut};
use crate::api::BucketApi;

const ERR_GET: &str = "cannot get bucket request payment";
const ERR_PUT: &str = "cannot put bucket request payment";

/// Reconciles `paymentConfiguration`.
#[derive(Debug)]
pub struct RequestPaymentClient {
    api: Arc<dyn BucketApi>,
}

impl RequestPaymentClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<RequestPaymentConfiguration> {
        self.api
            .get_bucket_request_payment(bucket_name(bucket))
            .await
            .map_err(|e| ProviderError::api(ERR_GET, e))
    }
}

#[async_trait]
impl Subresource<Bucket> for RequestPaymentClient {
    fn name(&self) -> &'static str {
        "request-payment"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        Ok(match &params(bucket).payment_configuration {
            Some(desired) if desired.payer != observed.payer => ResourceStatus::NeedsUpdate,
            _ => ResourceStatus::Updated,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).payment_configuration else {
            return Ok(());
        };
        self.api
            .put_bucket_request_payment(bucket_name(bucket), desired)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let observed = self.fetch(bucket).await?;
        params_mut(bucket).payment_configuration.get_or_insert(observed);
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).payment_configuration.is_some()
    }
}
