//! Cross-region and same-region replication.
//!
//! S3 fills in defaults on the rules it stores: an empty filter, disabled
//! delete marker replication and a zero priority all come back even when the
//! caller sent nothing. Both sides are normalized so that an absent field and
//! its provider default compare equal, and rules are ordered by priority.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::late_init::late_init;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::bucket::{DestinationSpec, ReplicationConfigurationSpec, ReplicationRuleSpec};
use rustack_s3_model::types::{
    Destination, ReplicationConfiguration, ReplicationRule, ReplicationRuleFilter, RuleStatus,
};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params, params_mut};
use crate::api::BucketApi;
use crate::compare::normalize_replication_filter;
use crate::validation::validate_replication;

const ERR_GET: &str = "cannot get replication configuration";
const ERR_PUT: &str = "cannot put replication configuration";
const ERR_DELETE: &str = "cannot delete replication configuration";

/// Reconciles `replicationConfiguration`.
#[derive(Debug)]
pub struct ReplicationClient {
    api: Arc<dyn BucketApi>,
}

impl ReplicationClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<Option<ReplicationConfiguration>> {
        optional(
            self.api.get_bucket_replication(bucket_name(bucket)).await,
            &S3ErrorCode::ReplicationConfigurationNotFoundError,
            ERR_GET,
        )
    }
}

fn destination(spec: &DestinationSpec) -> Destination {
    Destination {
        bucket: spec.bucket.clone().unwrap_or_default(),
        account: spec.account.clone(),
        storage_class: spec.storage_class.clone(),
        access_control_translation: spec.access_control_translation.clone(),
        encryption_configuration: spec.encryption_configuration.clone(),
        replication_time: spec.replication_time.clone(),
        metrics: spec.metrics.clone(),
    }
}

fn rule(spec: &ReplicationRuleSpec) -> ReplicationRule {
    ReplicationRule {
        id: spec.id.clone(),
        priority: spec.priority,
        status: spec.status,
        filter: spec.filter.clone(),
        destination: destination(&spec.destination),
        delete_marker_replication: spec.delete_marker_replication,
        source_selection_criteria: spec.source_selection_criteria.clone(),
        existing_object_replication: spec.existing_object_replication,
    }
}

/// The provider request for a desired block. References are resolved by now.
fn generate(spec: &ReplicationConfigurationSpec) -> ReplicationConfiguration {
    ReplicationConfiguration {
        role: spec.role.clone().unwrap_or_default(),
        rules: spec.rules.iter().map(rule).collect(),
    }
}

fn enabled_only(status: Option<RuleStatus>) -> Option<RuleStatus> {
    status.filter(|s| *s == RuleStatus::Enabled)
}

fn normalize(config: &ReplicationConfiguration) -> ReplicationConfiguration {
    let mut rules: Vec<ReplicationRule> = config
        .rules
        .iter()
        .map(|r| ReplicationRule {
            priority: r.priority.filter(|p| *p != 0),
            filter: r
                .filter
                .as_ref()
                .map(normalize_replication_filter)
                .filter(|f| *f != ReplicationRuleFilter::default()),
            delete_marker_replication: enabled_only(r.delete_marker_replication),
            existing_object_replication: enabled_only(r.existing_object_replication),
            ..r.clone()
        })
        .collect();
    rules.sort_by_key(|r| r.priority.unwrap_or_default());
    ReplicationConfiguration {
        role: config.role.clone(),
        rules,
    }
}

fn late_init_rule(desired: &mut ReplicationRuleSpec, observed: &ReplicationRule) {
    late_init(&mut desired.priority, observed.priority.as_ref());
    late_init(
        &mut desired.delete_marker_replication,
        observed.delete_marker_replication.as_ref(),
    );
    late_init(
        &mut desired.existing_object_replication,
        observed.existing_object_replication.as_ref(),
    );
    late_init(&mut desired.filter, observed.filter.as_ref());
}

#[async_trait]
impl Subresource<Bucket> for ReplicationClient {
    fn name(&self) -> &'static str {
        "replication"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        Ok(match (&params(bucket).replication_configuration, observed) {
            (None, None) => ResourceStatus::Updated,
            (None, Some(_)) => ResourceStatus::NeedsDeletion,
            (Some(_), None) => ResourceStatus::NeedsUpdate,
            (Some(desired), Some(observed)) => {
                if normalize(&generate(desired)) == normalize(&observed) {
                    ResourceStatus::Updated
                } else {
                    ResourceStatus::NeedsUpdate
                }
            }
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).replication_configuration else {
            return Ok(());
        };
        let config = generate(desired);
        validate_replication(&config)?;
        self.api
            .put_bucket_replication(bucket_name(bucket), &config)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    // Only fills rule defaults; rules themselves are never adopted, and only
    // when both sides have the same number of rules to pair them up.
    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let Some(observed) = self.fetch(bucket).await? else {
            return Ok(());
        };
        let Some(desired) = params_mut(bucket).replication_configuration.as_mut() else {
            return Ok(());
        };
        if desired.rules.len() != observed.rules.len() {
            return Ok(());
        }
        for (d, o) in desired.rules.iter_mut().zip(&observed.rules) {
            late_init_rule(d, o);
        }
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).replication_configuration.is_some()
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for ReplicationClient {
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        ignore_missing(
            self.api.delete_bucket_replication(bucket_name(bucket)).await,
            &S3ErrorCode::ReplicationConfigurationNotFoundError,
            ERR_DELETE,
        )
    }
}

#[cfg(test)]
mod tests {
    use rustack_s3_model::BucketParameters;
    use rustack_s3_model::types::{BucketVersioningStatus, VersioningConfiguration};

    use super::*;
    use crate::subresource::testing::{BUCKET, bucket, store};

    const ROLE: &str = "arn:aws:iam::123456789012:role/replication";
    const DEST: &str = "arn:aws:s3:::acme-logs-replica";

    fn replicate() -> BucketParameters {
        BucketParameters {
            replication_configuration: Some(ReplicationConfigurationSpec {
                role: Some(ROLE.into()),
                rules: vec![ReplicationRuleSpec {
                    id: Some("all".into()),
                    priority: None,
                    status: RuleStatus::Enabled,
                    filter: None,
                    destination: DestinationSpec {
                        bucket: Some(DEST.into()),
                        ..DestinationSpec::default()
                    },
                    delete_marker_replication: None,
                    source_selection_criteria: None,
                    existing_object_replication: None,
                }],
                ..ReplicationConfigurationSpec::default()
            }),
            ..BucketParameters::default()
        }
    }

    async fn versioned() -> (Arc<crate::memory::MemoryBucketApi>, Arc<dyn BucketApi>) {
        let (store, api) = store().await;
        store
            .put_bucket_versioning(
                BUCKET,
                &VersioningConfiguration {
                    status: Some(BucketVersioningStatus::Enabled),
                    mfa_delete: None,
                },
            )
            .await
            .unwrap();
        (store, api)
    }

    #[tokio::test]
    async fn test_should_treat_provider_defaults_as_absent() {
        let (store, api) = versioned().await;
        let mut stored = generate(replicate().replication_configuration.as_ref().unwrap());
        stored.rules[0].priority = Some(0);
        stored.rules[0].filter = Some(ReplicationRuleFilter::default());
        stored.rules[0].delete_marker_replication = Some(RuleStatus::Disabled);
        store.put_bucket_replication(BUCKET, &stored).await.unwrap();

        let client = ReplicationClient::new(api);
        assert_eq!(client.observe(&bucket(replicate())).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_surface_missing_versioning_as_api_error() {
        let (_, api) = store().await;
        let err = ReplicationClient::new(api)
            .create_or_update(&bucket(replicate()))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with(ERR_PUT));
    }

    #[tokio::test]
    async fn test_should_reject_unresolved_role() {
        let (store, api) = versioned().await;
        let mut params = replicate();
        params.replication_configuration.as_mut().unwrap().role = None;
        let err = ReplicationClient::new(api)
            .create_or_update(&bucket(params))
            .await
            .unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(store.count("PutBucketReplication"), 0);
    }

    #[tokio::test]
    async fn test_should_late_init_rule_defaults_only() {
        let (store, api) = versioned().await;
        let mut stored = generate(replicate().replication_configuration.as_ref().unwrap());
        stored.rules[0].priority = Some(1);
        stored.rules[0].delete_marker_replication = Some(RuleStatus::Disabled);
        store.put_bucket_replication(BUCKET, &stored).await.unwrap();

        let client = ReplicationClient::new(api);
        let mut b = bucket(replicate());
        client.late_initialize(&mut b).await.unwrap();
        let rule = &b.spec.for_provider.replication_configuration.as_ref().unwrap().rules[0];
        assert_eq!(rule.priority, Some(1));
        assert_eq!(rule.delete_marker_replication, Some(RuleStatus::Disabled));

        let mut unset = bucket(BucketParameters::default());
        client.late_initialize(&mut unset).await.unwrap();
        assert!(unset.spec.for_provider.replication_configuration.is_none());
    }

    #[tokio::test]
    async fn test_should_delete_when_block_removed() {
        let (store, api) = versioned().await;
        let client = ReplicationClient::new(api);
        client.create_or_update(&bucket(replicate())).await.unwrap();

        let b = bucket(BucketParameters::default());
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::NeedsDeletion);
        client.deleter().unwrap().delete(&b).await.unwrap();
        assert_eq!(store.count("DeleteBucketReplication"), 1);
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
    }
}
