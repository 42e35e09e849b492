//! Default server-side encryption.
//!
//! New buckets come with SSE-S3 on, so an unset block is late-initialized
//! from what the provider reports instead of being deleted.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::late_init::{late_init, late_init_string};
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::bucket::{
    ServerSideEncryptionByDefaultSpec, ServerSideEncryptionConfigurationSpec,
    ServerSideEncryptionRuleSpec,
};
use rustack_s3_model::types::{
    ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration, ServerSideEncryptionRule,
};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params, params_mut};
use crate::api::BucketApi;
use crate::validation::validate_encryption;

const ERR_GET: &str = "cannot get bucket encryption";
const ERR_PUT: &str = "cannot put bucket encryption";
const ERR_DELETE: &str = "cannot delete bucket encryption configuration";

/// Reconciles `serverSideEncryptionConfiguration`.
#[derive(Debug)]
pub struct EncryptionClient {
    api: Arc<dyn BucketApi>,
}

impl EncryptionClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    async fn fetch(
        &self,
        bucket: &Bucket,
    ) -> ProviderResult<Option<ServerSideEncryptionConfiguration>> {
        optional(
            self.api.get_bucket_encryption(bucket_name(bucket)).await,
            &S3ErrorCode::ServerSideEncryptionConfigurationNotFoundError,
            ERR_GET,
        )
    }
}

fn generate(spec: &ServerSideEncryptionConfigurationSpec) -> ServerSideEncryptionConfiguration {
    ServerSideEncryptionConfiguration {
        rules: spec
            .rules
            .iter()
            .map(|r| ServerSideEncryptionRule {
                apply_server_side_encryption_by_default: Some(ServerSideEncryptionByDefault {
                    sse_algorithm: r.apply_server_side_encryption_by_default.sse_algorithm,
                    kms_master_key_id: r
                        .apply_server_side_encryption_by_default
                        .kms_master_key_id
                        .clone(),
                }),
                bucket_key_enabled: r.bucket_key_enabled,
            })
            .collect(),
    }
}

fn rule_matches(desired: &ServerSideEncryptionRule, observed: &ServerSideEncryptionRule) -> bool {
    if desired.bucket_key_enabled.unwrap_or(false) != observed.bucket_key_enabled.unwrap_or(false)
    {
        return false;
    }
    match (
        &desired.apply_server_side_encryption_by_default,
        &observed.apply_server_side_encryption_by_default,
    ) {
        (Some(d), Some(o)) => {
            d.sse_algorithm == o.sse_algorithm
                && d.kms_master_key_id.as_deref().unwrap_or_default()
                    == o.kms_master_key_id.as_deref().unwrap_or_default()
        }
        (None, None) => true,
        _ => false,
    }
}

fn matches(
    desired: &ServerSideEncryptionConfiguration,
    observed: &ServerSideEncryptionConfiguration,
) -> bool {
    desired.rules.len() == observed.rules.len()
        && desired
            .rules
            .iter()
            .zip(&observed.rules)
            .all(|(d, o)| rule_matches(d, o))
}

fn spec_from(
    observed: &ServerSideEncryptionConfiguration,
) -> ServerSideEncryptionConfigurationSpec {
    ServerSideEncryptionConfigurationSpec {
        rules: observed
            .rules
            .iter()
            .filter_map(|r| {
                let by_default = r.apply_server_side_encryption_by_default.as_ref()?;
                Some(ServerSideEncryptionRuleSpec {
                    apply_server_side_encryption_by_default: ServerSideEncryptionByDefaultSpec {
                        sse_algorithm: by_default.sse_algorithm,
                        kms_master_key_id: by_default.kms_master_key_id.clone(),
                        kms_master_key_id_ref: None,
                        kms_master_key_id_selector: None,
                    },
                    bucket_key_enabled: r.bucket_key_enabled,
                })
            })
            .collect(),
    }
}

#[async_trait]
impl Subresource<Bucket> for EncryptionClient {
    fn name(&self) -> &'static str {
        "encryption"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        Ok(match (&params(bucket).server_side_encryption_configuration, observed) {
            (None, None) => ResourceStatus::Updated,
            (None, Some(_)) => ResourceStatus::NeedsDeletion,
            (Some(_), None) => ResourceStatus::NeedsUpdate,
            (Some(desired), Some(observed)) if matches(&generate(desired), &observed) => {
                ResourceStatus::Updated
            }
            (Some(_), Some(_)) => ResourceStatus::NeedsUpdate,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).server_side_encryption_configuration else {
            return Ok(());
        };
        let config = generate(desired);
        validate_encryption(&config)?;
        self.api
            .put_bucket_encryption(bucket_name(bucket), &config)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let Some(observed) = self.fetch(bucket).await? else {
            return Ok(());
        };
        let slot = &mut params_mut(bucket).server_side_encryption_configuration;
        if slot.is_none() {
            *slot = Some(spec_from(&observed));
            return Ok(());
        }
        let desired = slot.get_or_insert_with(ServerSideEncryptionConfigurationSpec::default);
        for (d, o) in desired.rules.iter_mut().zip(&observed.rules) {
            late_init(&mut d.bucket_key_enabled, o.bucket_key_enabled.as_ref());
            let by_default = &mut d.apply_server_side_encryption_by_default;
            if by_default.sse_algorithm.uses_kms() {
                late_init_string(
                    &mut by_default.kms_master_key_id,
                    o.apply_server_side_encryption_by_default
                        .as_ref()
                        .and_then(|b| b.kms_master_key_id.as_deref()),
                );
            }
        }
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).server_side_encryption_configuration.is_some()
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for EncryptionClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        ignore_missing(
            self.api.delete_bucket_encryption(bucket_name(bucket)).await,
            &S3ErrorCode::ServerSideEncryptionConfigurationNotFoundError,
            ERR_DELETE,
        )
    }
}
