//! Bucket policy.
//!
//! An unset `policy` leaves an existing policy alone unless
//! `policyUpdatePolicy.deletionPolicy` is `IfNull`.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::bucket::PolicyDeletionPolicy;
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params};
use crate::api::BucketApi;
use crate::policy::{policy_matches, serialize_policy};

const ERR_GET: &str = "cannot get bucket policy";
const ERR_PUT: &str = "cannot put bucket policy";
const ERR_DELETE: &str = "cannot delete bucket policy";
const ERR_PARSE: &str = "cannot parse bucket policy";

/// Reconciles `policy`.
#[derive(Debug)]
pub struct PolicyClient {
    api: Arc<dyn BucketApi>,
}

impl PolicyClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }
}

fn delete_if_unset(bucket: &Bucket) -> bool {
    params(bucket)
        .policy_update_policy
        .as_ref()
        .is_some_and(|p| p.deletion_policy == PolicyDeletionPolicy::IfNull)
}

#[async_trait]
impl Subresource<Bucket> for PolicyClient {
    fn name(&self) -> &'static str {
        "policy"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = optional(
            self.api.get_bucket_policy(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchBucketPolicy,
            ERR_GET,
        )?;
        match (&params(bucket).policy, observed) {
            (None, Some(_)) if delete_if_unset(bucket) => Ok(ResourceStatus::NeedsDeletion),
            (None, _) => Ok(ResourceStatus::Updated),
            (Some(_), None) => Ok(ResourceStatus::NeedsUpdate),
            (Some(desired), Some(observed)) => {
                let same = policy_matches(desired, &observed)
                    .map_err(|e| ProviderError::api(ERR_PARSE, e))?;
                Ok(if same {
                    ResourceStatus::Updated
                } else {
                    ResourceStatus::NeedsUpdate
                })
            }
        }
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).policy else {
            return Ok(());
        };
        self.api
            .put_bucket_policy(bucket_name(bucket), &serialize_policy(desired))
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, _bucket: &mut Bucket) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).policy.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for PolicyClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        ignore_missing(
            self.api.delete_bucket_policy(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchBucketPolicy,
            ERR_DELETE,
        )
    }
}
