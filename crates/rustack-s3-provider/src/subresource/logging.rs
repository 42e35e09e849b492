//! Server access logging. There is no delete API; logging is turned off
//! with an empty logging status, which this client never sends on its own.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::late_init::{late_init_string, late_init_vec};
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use rustack_s3_model::Bucket;
use rustack_s3_model::bucket::LoggingConfigurationSpec;
use rustack_s3_model::types::{BucketLoggingStatus, LoggingEnabled};

use super::{bucket_name, params, params_mut};
use crate::api::BucketApi;

const ERR_GET: &str = "cannot get bucket logging";
const ERR_PUT: &str = "cannot put bucket logging";

/// Reconciles `loggingConfiguration`.
#[derive(Debug)]
pub struct LoggingClient {
    api: Arc<dyn BucketApi>,
}

impl LoggingClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<BucketLoggingStatus> {
        self.api
            .get_bucket_logging(bucket_name(bucket))
            .await
            .map_err(|e| ProviderError::api(ERR_GET, e))
    }
}

/// The provider request for a desired block. References are resolved by now.
fn generate(spec: &LoggingConfigurationSpec) -> LoggingEnabled {
    LoggingEnabled {
        target_bucket: spec.target_bucket.clone().unwrap_or_default(),
        target_prefix: spec.target_prefix.clone().unwrap_or_default(),
        target_grants: spec.target_grants.clone(),
    }
}

#[async_trait]
impl Subresource<Bucket> for LoggingClient {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        let Some(desired) = &params(bucket).logging_configuration else {
            return Ok(ResourceStatus::Updated);
        };
        Ok(match observed.logging_enabled {
            Some(observed) if observed == generate(desired) => ResourceStatus::Updated,
            _ => ResourceStatus::NeedsUpdate,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).logging_configuration else {
            return Ok(());
        };
        if desired.target_bucket.as_deref().is_none_or(str::is_empty) {
            return Err(ProviderError::configuration(
                "logging configuration needs a target bucket",
            ));
        }
        let status = BucketLoggingStatus {
            logging_enabled: Some(generate(desired)),
        };
        self.api
            .put_bucket_logging(bucket_name(bucket), &status)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let Some(observed) = self.fetch(bucket).await?.logging_enabled else {
            return Ok(());
        };
        let desired = params_mut(bucket)
            .logging_configuration
            .get_or_insert_with(LoggingConfigurationSpec::default);
        late_init_string(&mut desired.target_bucket, Some(observed.target_bucket.as_str()));
        late_init_string(&mut desired.target_prefix, Some(observed.target_prefix.as_str()));
        late_init_vec(&mut desired.target_grants, &observed.target_grants);
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).logging_configuration.is_some()
    }
}
