//! Public access block.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::types::PublicAccessBlockConfiguration;
use rustack_s3_model::{Bucket, S3Error, S3ErrorCode};

use super::{bucket_name, params};
use crate::api::{BucketApi, S3Result};

const ERR_GET: &str = "cannot get public access block";
const ERR_PUT: &str = "cannot put public access block";
const ERR_DELETE: &str = "cannot delete public access block";

/// Reconciles `publicAccessBlockConfiguration`.
#[derive(Debug)]
pub struct PublicAccessBlockClient {
    api: Arc<dyn BucketApi>,
}

impl PublicAccessBlockClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }
}

/// Some S3-compatible endpoints answer a missing block with a bare 404.
fn is_unset(err: &S3Error) -> bool {
    err.is_code(&S3ErrorCode::NoSuchPublicAccessBlockConfiguration)
        || (err.status_code == http::StatusCode::NOT_FOUND
            && !err.is_code(&S3ErrorCode::NoSuchBucket))
}

fn unset_as_none<T>(result: S3Result<T>, context: &'static str) -> ProviderResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if is_unset(&err) => Ok(None),
        Err(err) => Err(ProviderError::api(context, err)),
    }
}

/// Four flags with unset meaning `false`.
fn flags(config: &PublicAccessBlockConfiguration) -> [bool; 4] {
    [
        config.block_public_acls.unwrap_or(false),
        config.ignore_public_acls.unwrap_or(false),
        config.block_public_policy.unwrap_or(false),
        config.restrict_public_buckets.unwrap_or(false),
    ]
}

#[async_trait]
impl Subresource<Bucket> for PublicAccessBlockClient {
    fn name(&self) -> &'static str {
        "public-access-block"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = unset_as_none(
            self.api.get_public_access_block(bucket_name(bucket)).await,
            ERR_GET,
        )?;
        Ok(match (&params(bucket).public_access_block_configuration, observed) {
            (None, None) => ResourceStatus::Updated,
            (None, Some(_)) => ResourceStatus::NeedsDeletion,
            (Some(desired), observed) => {
                if flags(desired) == flags(&observed.unwrap_or_default()) {
                    ResourceStatus::Updated
                } else {
                    ResourceStatus::NeedsUpdate
                }
            }
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).public_access_block_configuration else {
            return Ok(());
        };
        self.api
            .put_public_access_block(bucket_name(bucket), desired)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, _bucket: &mut Bucket) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).public_access_block_configuration.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for PublicAccessBlockClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        unset_as_none(
            self.api.delete_public_access_block(bucket_name(bucket)).await,
            ERR_DELETE,
        )
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use rustack_s3_model::BucketParameters;

    use super::*;
    use crate::subresource::testing::{bucket, store};

    fn block_all() -> BucketParameters {
        BucketParameters {
            public_access_block_configuration: Some(PublicAccessBlockConfiguration {
                block_public_acls: Some(true),
                ignore_public_acls: Some(true),
                block_public_policy: Some(true),
                restrict_public_buckets: Some(true),
            }),
            ..BucketParameters::default()
        }
    }

    #[tokio::test]
    async fn test_should_treat_all_false_as_unset() {
        let (_, api) = store().await;
        let client = PublicAccessBlockClient::new(api);
        let b = bucket(BucketParameters {
            public_access_block_configuration: Some(PublicAccessBlockConfiguration {
                block_public_acls: Some(false),
                ..PublicAccessBlockConfiguration::default()
            }),
            ..BucketParameters::default()
        });
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_block_then_unblock() {
        let (store, api) = store().await;
        let client = PublicAccessBlockClient::new(api);
        let b = bucket(block_all());
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::NeedsUpdate);
        client.create_or_update(&b).await.unwrap();
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);

        let removed = bucket(BucketParameters::default());
        assert_eq!(client.observe(&removed).await.unwrap(), ResourceStatus::NeedsDeletion);
        client.deleter().unwrap().delete(&removed).await.unwrap();
        assert_eq!(store.count("DeletePublicAccessBlock"), 1);
    }

    #[tokio::test]
    async fn test_should_read_bare_not_found_as_unset() {
        let (store, api) = store().await;
        store.fail_next(
            "GetPublicAccessBlock",
            S3Error::new(S3ErrorCode::Other("NoSuchPublicAccessBlock".into()))
                .with_status(http::StatusCode::NOT_FOUND),
        );
        let client = PublicAccessBlockClient::new(api);
        let b = bucket(BucketParameters::default());
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
    }
}
