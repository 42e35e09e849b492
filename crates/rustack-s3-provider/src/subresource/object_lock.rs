//! Object lock.
//!
//! Object lock can be turned on for a versioned bucket but never turned off.
//! A desired `Disabled` on a locked bucket is reported as drift and then
//! refused as a configuration error without calling the provider.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustack_provider_core::late_init::late_init;
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use rustack_s3_model::bucket::{ObjectLockConfigurationSpec, ObjectLockState};
use rustack_s3_model::types::{ObjectLockConfiguration, ObjectLockEnabled, ObjectLockRule};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, optional, params, params_mut};
use crate::api::BucketApi;
use crate::validation::validate_object_lock_rule;

const ERR_GET: &str = "cannot get object lock configuration";
const ERR_PUT: &str = "cannot put object lock configuration";
const ERR_DISABLE: &str = "object lock cannot be disabled once enabled";

/// Reconciles `objectLockConfiguration`.
#[derive(Debug)]
pub struct ObjectLockClient {
    api: Arc<dyn BucketApi>,
    /// Configuration seen by the last observe.
    observed: Mutex<Option<ObjectLockConfiguration>>,
}

impl ObjectLockClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self {
            api,
            observed: Mutex::new(None),
        }
    }

    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<ObjectLockConfiguration> {
        let config = optional(
            self.api
                .get_object_lock_configuration(bucket_name(bucket))
                .await,
            &S3ErrorCode::ObjectLockConfigurationNotFoundError,
            ERR_GET,
        )?
        .unwrap_or_default();
        *self.observed.lock() = Some(config.clone());
        Ok(config)
    }

    async fn current(&self, bucket: &Bucket) -> ProviderResult<ObjectLockConfiguration> {
        let memo = self.observed.lock().clone();
        match memo {
            Some(config) => Ok(config),
            None => self.fetch(bucket).await,
        }
    }
}

fn is_enabled(config: &ObjectLockConfiguration) -> bool {
    config.object_lock_enabled == Some(ObjectLockEnabled::Enabled)
}

fn rule_or_default(rule: Option<&ObjectLockRule>) -> ObjectLockRule {
    rule.cloned().unwrap_or_default()
}

#[async_trait]
impl Subresource<Bucket> for ObjectLockClient {
    fn name(&self) -> &'static str {
        "object-lock"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        let Some(desired) = &params(bucket).object_lock_configuration else {
            return Ok(ResourceStatus::Updated);
        };
        let drift = match (desired.object_lock_enabled, is_enabled(&observed)) {
            (Some(ObjectLockState::Disabled), true) => true,
            (Some(ObjectLockState::Enabled), false) => true,
            (_, true) => {
                rule_or_default(desired.rule.as_ref()) != rule_or_default(observed.rule.as_ref())
            }
            _ => false,
        };
        Ok(if drift {
            ResourceStatus::NeedsUpdate
        } else {
            ResourceStatus::Updated
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).object_lock_configuration else {
            return Ok(());
        };
        let enabled = is_enabled(&self.current(bucket).await?);
        match desired.object_lock_enabled {
            Some(ObjectLockState::Disabled) if enabled => {
                return Err(ProviderError::configuration(ERR_DISABLE));
            }
            Some(ObjectLockState::Disabled) => return Ok(()),
            None if !enabled => return Ok(()),
            _ => {}
        }
        if let Some(rule) = &desired.rule {
            validate_object_lock_rule(rule)?;
        }
        let config = ObjectLockConfiguration {
            object_lock_enabled: Some(ObjectLockEnabled::Enabled),
            rule: desired.rule.clone(),
        };
        self.api
            .put_object_lock_configuration(bucket_name(bucket), &config)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))?;
        *self.observed.lock() = Some(config);
        Ok(())
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let observed = self.fetch(bucket).await?;
        if !is_enabled(&observed) {
            return Ok(());
        }
        let desired = params_mut(bucket)
            .object_lock_configuration
            .get_or_insert_with(ObjectLockConfigurationSpec::default);
        late_init(&mut desired.object_lock_enabled, Some(&ObjectLockState::Enabled));
        late_init(&mut desired.rule, observed.rule.as_ref());
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).object_lock_configuration.is_some()
    }
}
