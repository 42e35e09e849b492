//! Bucket CORS rules.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params};
use crate::api::BucketApi;

const ERR_GET: &str = "cannot get bucket cors";
const ERR_PUT: &str = "cannot put bucket cors";
const ERR_DELETE: &str = "cannot delete bucket cors configuration";

/// Reconciles `corsConfiguration`.
#[derive(Debug)]
pub struct CorsClient {
    api: Arc<dyn BucketApi>,
}

impl CorsClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Subresource<Bucket> for CorsClient {
    fn name(&self) -> &'static str {
        "cors"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = optional(
            self.api.get_bucket_cors(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchCORSConfiguration,
            ERR_GET,
        )?
        .unwrap_or_default();

        Ok(match &params(bucket).cors_configuration {
            None if !observed.cors_rules.is_empty() => ResourceStatus::NeedsDeletion,
            None => ResourceStatus::Updated,
            Some(desired) if desired.cors_rules != observed.cors_rules => {
                ResourceStatus::NeedsUpdate
            }
            Some(_) => ResourceStatus::Updated,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).cors_configuration else {
            return Ok(());
        };
        self.api
            .put_bucket_cors(bucket_name(bucket), desired)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    // An unset block may mean the user removed the rules, so nothing is
    // adopted from the provider.
    async fn late_initialize(&self, _bucket: &mut Bucket) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).cors_configuration.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for CorsClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        ignore_missing(
            self.api.delete_bucket_cors(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchCORSConfiguration,
            ERR_DELETE,
        )
    }
}

#[cfg(test)]
mod tests {
    use rustack_s3_model::BucketParameters;

    use super::*;
    use crate::subresource::testing::{BUCKET, bucket, cors_rules, store};

    #[tokio::test]
    async fn test_should_be_updated_with_nothing_on_either_side() {
        let (store, api) = store().await;
        let client = CorsClient::new(api);
        let b = bucket(BucketParameters::default());
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
        assert_eq!(store.operations(), vec!["GetBucketCors"]);
    }

    #[tokio::test]
    async fn test_should_need_deletion_when_block_removed() {
        let (store, api) = store().await;
        store.put_bucket_cors(BUCKET, &cors_rules()).await.unwrap();
        let client = CorsClient::new(api);
        let b = bucket(BucketParameters::default());

        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::NeedsDeletion);
        client.deleter().unwrap().delete(&b).await.unwrap();
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_put_desired_rules() {
        let (store, api) = store().await;
        let client = CorsClient::new(api);
        let b = bucket(BucketParameters {
            cors_configuration: Some(cors_rules()),
            ..BucketParameters::default()
        });

        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::NeedsUpdate);
        client.create_or_update(&b).await.unwrap();
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
        assert_eq!(store.get_bucket_cors(BUCKET).await.unwrap(), cors_rules());
    }

    #[tokio::test]
    async fn test_should_ignore_missing_on_delete() {
        let (store, api) = store().await;
        store.fail_next(
            "DeleteBucketCors",
            rustack_s3_model::S3Error::new(S3ErrorCode::NoSuchCORSConfiguration),
        );
        let client = CorsClient::new(api);
        client
            .deleter()
            .unwrap()
            .delete(&bucket(BucketParameters::default()))
            .await
            .unwrap();
    }
}
