//! Bucket lifecycle rules.
//!
//! S3 keeps the caller's rule order, so rules are compared position by
//! position. Tag lists inside `and` filters come back sorted and are sorted
//! on both sides first.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::types::{LifecycleConfiguration, LifecycleRule};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params};
use crate::api::BucketApi;
use crate::compare::normalize_lifecycle_filter;
use crate::validation::validate_lifecycle;

const ERR_GET: &str = "cannot get bucket lifecycle";
const ERR_PUT: &str = "cannot put bucket lifecycle";
const ERR_DELETE: &str = "cannot delete bucket lifecycle configuration";

/// Reconciles `lifecycleConfiguration`.
#[derive(Debug)]
pub struct LifecycleClient {
    api: Arc<dyn BucketApi>,
}

impl LifecycleClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }
}

fn normalize(rules: &[LifecycleRule]) -> Vec<LifecycleRule> {
    rules
        .iter()
        .map(|rule| LifecycleRule {
            filter: rule.filter.as_ref().map(normalize_lifecycle_filter),
            ..rule.clone()
        })
        .collect()
}

#[async_trait]
impl Subresource<Bucket> for LifecycleClient {
    fn name(&self) -> &'static str {
        "lifecycle"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = optional(
            self.api
                .get_bucket_lifecycle_configuration(bucket_name(bucket))
                .await,
            &S3ErrorCode::NoSuchLifecycleConfiguration,
            ERR_GET,
        )?
        .unwrap_or_default();

        Ok(match &params(bucket).lifecycle_configuration {
            None if observed.rules.is_empty() => ResourceStatus::Updated,
            None => ResourceStatus::NeedsDeletion,
            Some(desired) if normalize(&desired.rules) != normalize(&observed.rules) => {
                ResourceStatus::NeedsUpdate
            }
            Some(_) => ResourceStatus::Updated,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).lifecycle_configuration else {
            return Ok(());
        };
        validate_lifecycle(desired)?;
        let config = LifecycleConfiguration {
            rules: normalize(&desired.rules),
        };
        self.api
            .put_bucket_lifecycle_configuration(bucket_name(bucket), &config)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    // Rules cannot be adopted without risking a resurrected deletion.
    async fn late_initialize(&self, _bucket: &mut Bucket) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).lifecycle_configuration.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for LifecycleClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        ignore_missing(
            self.api.delete_bucket_lifecycle(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchLifecycleConfiguration,
            ERR_DELETE,
        )
    }
}

#[cfg(test)]
mod tests {
    use rustack_s3_model::BucketParameters;
    use rustack_s3_model::types::{
        LifecycleExpiration, LifecycleRuleAndOperator, LifecycleRuleFilter, RuleStatus, Tag,
    };

    use super::*;
    use crate::subresource::testing::{BUCKET, bucket, store};

    fn rule(filter: LifecycleRuleFilter) -> LifecycleRule {
        LifecycleRule {
            id: Some("expire-tmp".into()),
            status: RuleStatus::Enabled,
            filter: Some(filter),
            expiration: Some(LifecycleExpiration {
                days: Some(30),
                ..LifecycleExpiration::default()
            }),
            transitions: vec![],
            noncurrent_version_expiration: None,
            noncurrent_version_transitions: vec![],
            abort_incomplete_multipart_upload: None,
        }
    }

    fn with_rules(rules: Vec<LifecycleRule>) -> BucketParameters {
        BucketParameters {
            lifecycle_configuration: Some(LifecycleConfiguration { rules }),
            ..BucketParameters::default()
        }
    }

    #[tokio::test]
    async fn test_should_ignore_and_tag_order() {
        let (store, api) = store().await;
        let and = |tags| LifecycleRuleFilter {
            and: Some(LifecycleRuleAndOperator {
                prefix: Some("tmp/".into()),
                tags,
                ..LifecycleRuleAndOperator::default()
            }),
            ..LifecycleRuleFilter::default()
        };
        store
            .put_bucket_lifecycle_configuration(
                BUCKET,
                &LifecycleConfiguration {
                    rules: vec![rule(and(vec![Tag::new("a", "1"), Tag::new("b", "2")]))],
                },
            )
            .await
            .unwrap();

        let client = LifecycleClient::new(api);
        let b = bucket(with_rules(vec![rule(and(vec![
            Tag::new("b", "2"),
            Tag::new("a", "1"),
        ]))]));
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_reject_invalid_rules_before_put() {
        let (store, api) = store().await;
        let client = LifecycleClient::new(api);
        let mut bad = rule(LifecycleRuleFilter {
            prefix: Some("tmp/".into()),
            ..LifecycleRuleFilter::default()
        });
        bad.expiration = Some(LifecycleExpiration {
            date: Some(chrono::Utc::now()),
            days: Some(30),
            expired_object_delete_marker: None,
        });

        let err = client
            .create_or_update(&bucket(with_rules(vec![bad])))
            .await
            .unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(store.count("PutBucketLifecycleConfiguration"), 0);
    }

    #[tokio::test]
    async fn test_should_delete_removed_rules() {
        let (store, api) = store().await;
        let client = LifecycleClient::new(api);
        let prefix = LifecycleRuleFilter {
            prefix: Some("tmp/".into()),
            ..LifecycleRuleFilter::default()
        };
        client
            .create_or_update(&bucket(with_rules(vec![rule(prefix)])))
            .await
            .unwrap();

        let b = bucket(BucketParameters::default());
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::NeedsDeletion);
        client.deleter().unwrap().delete(&b).await.unwrap();
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
        assert_eq!(store.count("DeleteBucketLifecycle"), 1);
    }
}
