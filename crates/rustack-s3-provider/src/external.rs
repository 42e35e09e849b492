//! The bucket engine.
//!
//! [`BucketEngine`] is the [`ExternalClient`] for `Bucket` resources. It owns
//! the bucket itself (head, create, delete, ACL and ownership controls) and
//! hands every configuration aspect to the ordered sub-resource set.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    AwsRegion, Condition, ConnectionDetails, ExternalClient, ExternalCreation,
    ExternalObservation, ExternalUpdate, Managed, Partition, ProviderError, ProviderResult,
    SubresourceSet,
};
use rustack_s3_model::types::{AclGrants, CreateBucketInput, ObjectOwnership, PutBucketAclInput};
use rustack_s3_model::{Bucket, BucketParameters};
use tracing::{debug, info};

use crate::api::BucketApi;
use crate::subresource::{bucket_name, bucket_subresources};
use crate::validation::validate_bucket_name;

const ERR_HEAD: &str = "cannot get bucket";
const ERR_CREATE: &str = "cannot create bucket";
const ERR_DELETE_BUCKET: &str = "cannot delete bucket";
const ERR_ACL: &str = "cannot put bucket acl";
const ERR_OWNERSHIP: &str = "cannot put bucket ownership controls";

/// Connection detail key holding the bucket name.
pub const CONNECTION_ENDPOINT: &str = "endpoint";
/// Connection detail key holding the bucket region.
pub const CONNECTION_REGION: &str = "region";

/// Region of a bucket; an empty location constraint means `us-east-1`.
#[must_use]
pub fn bucket_region(params: &BucketParameters) -> &str {
    if params.location_constraint.is_empty() {
        AwsRegion::DEFAULT
    } else {
        &params.location_constraint
    }
}

/// ARN of a bucket in `region`.
#[must_use]
pub fn bucket_arn(name: &str, region: &str) -> String {
    format!("arn:{}:s3:::{name}", Partition::for_region(region))
}

fn acl_grants(params: &BucketParameters) -> AclGrants {
    AclGrants {
        grant_full_control: params.grant_full_control.clone(),
        grant_read: params.grant_read.clone(),
        grant_read_acp: params.grant_read_acp.clone(),
        grant_write: params.grant_write.clone(),
        grant_write_acp: params.grant_write_acp.clone(),
    }
}

/// Reconciles one `Bucket` against a [`BucketApi`].
#[derive(Debug)]
pub struct BucketEngine {
    api: Arc<dyn BucketApi>,
    subresources: SubresourceSet<Bucket>,
}

impl BucketEngine {
    /// Create an engine with the standard sub-resource order.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        let subresources = bucket_subresources(&api);
        Self { api, subresources }
    }

    /// Sub-resource names in reconcile order.
    #[must_use]
    pub fn subresource_names(&self) -> Vec<&'static str> {
        self.subresources.names()
    }

    /// Ownership controls and ACL. Both are plain PUTs repeated every tick
    /// once the sub-resources are settled.
    async fn apply_access_settings(&self, bucket: &Bucket) -> ProviderResult<()> {
        let name = bucket_name(bucket);
        let params = &bucket.spec.for_provider;

        if let Some(ownership) = params.object_ownership {
            self.api
                .put_bucket_ownership_controls(name, ownership)
                .await
                .map_err(|e| ProviderError::api(ERR_OWNERSHIP, e))?;
        }
        // ACLs are rejected outright on owner-enforced buckets.
        if params.object_ownership == Some(ObjectOwnership::BucketOwnerEnforced) {
            return Ok(());
        }

        let grants = acl_grants(params);
        if params.acl.is_none() && grants.is_empty() {
            return Ok(());
        }
        self.api
            .put_bucket_acl(&PutBucketAclInput {
                bucket: name.to_owned(),
                acl: params.acl,
                grants,
            })
            .await
            .map_err(|e| ProviderError::api(ERR_ACL, e))
    }
}

fn connection_details(bucket: &Bucket) -> ConnectionDetails {
    ConnectionDetails::from([
        (CONNECTION_ENDPOINT.to_owned(), bucket_name(bucket).to_owned()),
        (
            CONNECTION_REGION.to_owned(),
            bucket_region(&bucket.spec.for_provider).to_owned(),
        ),
    ])
}

#[async_trait]
impl ExternalClient<Bucket> for BucketEngine {
    async fn observe(&self, bucket: &mut Bucket) -> ProviderResult<ExternalObservation> {
        let name = bucket_name(bucket).to_owned();
        match self.api.head_bucket(&name).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                debug!(bucket = %name, "bucket does not exist");
                return Ok(ExternalObservation::absent());
            }
            Err(err) => return Err(ProviderError::api(ERR_HEAD, err)),
        }

        let region = bucket_region(&bucket.spec.for_provider).to_owned();
        bucket.status.at_provider.arn = Some(bucket_arn(&name, &region));

        // Deletion only needs existence; no late-init and no access PUTs.
        if bucket.meta().is_deleting() {
            return Ok(ExternalObservation::present(true));
        }

        let desired = bucket.spec.for_provider.clone();
        self.subresources.late_initialize(bucket).await?;
        let late_initialized = bucket.spec.for_provider != desired;

        if let Some(drift) = self.subresources.first_drift(bucket).await? {
            debug!(
                bucket = %name,
                subresource = drift.subresource,
                status = ?drift.status,
                "bucket is out of date"
            );
            bucket.set_condition(Condition::unavailable());
            return Ok(ExternalObservation {
                resource_late_initialized: late_initialized,
                ..ExternalObservation::present(false)
            });
        }

        self.apply_access_settings(bucket).await?;
        bucket.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_late_initialized: late_initialized,
            connection_details: connection_details(bucket),
            ..ExternalObservation::present(true)
        })
    }

    async fn create(&self, bucket: &mut Bucket) -> ProviderResult<ExternalCreation> {
        let name = bucket_name(bucket).to_owned();
        validate_bucket_name(&name)?;

        let params = &bucket.spec.for_provider;
        let region = bucket_region(params);
        let input = CreateBucketInput {
            bucket: name.clone(),
            location_constraint: (region != AwsRegion::DEFAULT).then(|| region.to_owned()),
            acl: params.acl,
            grants: acl_grants(params),
            object_lock_enabled_for_bucket: params.object_lock_enabled_for_bucket.unwrap_or(false),
            object_ownership: params.object_ownership,
        };

        match self.api.create_bucket(&input).await {
            Ok(()) => info!(bucket = %name, region, "created bucket"),
            Err(err) if err.is_already_owned() => {
                debug!(bucket = %name, "bucket already owned, treating create as done");
            }
            Err(err) => return Err(ProviderError::api(ERR_CREATE, err)),
        }

        // Picks up provider defaults, e.g. SSE-S3 on new buckets.
        self.subresources.late_initialize_all(bucket).await?;
        Ok(ExternalCreation::default())
    }

    async fn update(&self, bucket: &Bucket) -> ProviderResult<ExternalUpdate> {
        self.subresources.apply(bucket).await?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        bucket.set_condition(Condition::deleting());
        let name = bucket_name(bucket);
        match self.api.delete_bucket(name).await {
            Ok(()) => {
                info!(bucket = %name, "deleted bucket");
                Ok(())
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(ProviderError::api(ERR_DELETE_BUCKET, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rustack_provider_core::{ConditionReason, ConditionType, ObjectMeta, get_condition};
    use rustack_s3_model::bucket::{
        ServerSideEncryptionByDefaultSpec, ServerSideEncryptionConfigurationSpec,
        ServerSideEncryptionRuleSpec,
    };
    use rustack_s3_model::types::{
        BucketCannedAcl, BucketVersioningStatus, LifecycleConfiguration, LifecycleExpiration,
        LifecycleRule, LifecycleRuleFilter, RuleStatus, ServerSideEncryption,
        VersioningConfiguration,
    };
    use rustack_s3_model::{S3Error, S3ErrorCode};

    use super::*;
    use crate::memory::{MemoryBucketApi, MemoryOptions};

    fn engine(options: MemoryOptions) -> (Arc<MemoryBucketApi>, BucketEngine) {
        let store = Arc::new(MemoryBucketApi::new(options));
        let api: Arc<dyn BucketApi> = store.clone();
        (store, BucketEngine::new(api))
    }

    fn managed(name: &str, params: BucketParameters) -> Bucket {
        let mut bucket = Bucket::new(ObjectMeta::named(name), params);
        bucket.metadata.set_external_name(name);
        bucket
    }

    fn acme_logs() -> Bucket {
        managed(
            "acme-logs",
            BucketParameters {
                location_constraint: "us-east-1".into(),
                versioning_configuration: Some(VersioningConfiguration {
                    status: Some(BucketVersioningStatus::Enabled),
                    mfa_delete: None,
                }),
                server_side_encryption_configuration: Some(ServerSideEncryptionConfigurationSpec {
                    rules: vec![ServerSideEncryptionRuleSpec {
                        apply_server_side_encryption_by_default:
                            ServerSideEncryptionByDefaultSpec {
                                sse_algorithm: ServerSideEncryption::Aes256,
                                kms_master_key_id: None,
                                kms_master_key_id_ref: None,
                                kms_master_key_id_selector: None,
                            },
                        bucket_key_enabled: Some(false),
                    }],
                }),
                lifecycle_configuration: Some(LifecycleConfiguration {
                    rules: vec![LifecycleRule {
                        id: Some("expire-tmp".into()),
                        status: RuleStatus::Enabled,
                        filter: Some(LifecycleRuleFilter {
                            prefix: Some("tmp/".into()),
                            ..LifecycleRuleFilter::default()
                        }),
                        expiration: Some(LifecycleExpiration {
                            days: Some(30),
                            ..LifecycleExpiration::default()
                        }),
                        transitions: vec![],
                        noncurrent_version_expiration: None,
                        noncurrent_version_transitions: vec![],
                        abort_incomplete_multipart_upload: None,
                    }],
                }),
                ..BucketParameters::default()
            },
        )
    }

    #[test]
    fn test_should_build_arn_per_partition() {
        assert_eq!(bucket_arn("a", "eu-west-1"), "arn:aws:s3:::a");
        assert_eq!(bucket_arn("a", "cn-north-1"), "arn:aws-cn:s3:::a");
        assert_eq!(bucket_arn("a", "us-gov-west-1"), "arn:aws-us-gov:s3:::a");
    }

    #[test]
    fn test_should_default_region_to_us_east_1() {
        assert_eq!(bucket_region(&BucketParameters::default()), "us-east-1");
    }

    #[tokio::test]
    async fn test_should_report_missing_bucket_as_absent() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = acme_logs();
        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(!obs.resource_exists);
        assert_eq!(store.operations(), vec!["HeadBucket"]);
    }

    #[tokio::test]
    async fn test_should_create_update_and_become_ready() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = acme_logs();

        engine.create(&mut bucket).await.unwrap();
        assert!(store.bucket_exists("acme-logs"));

        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(obs.resource_exists);
        assert!(!obs.resource_up_to_date);

        engine.update(&bucket).await.unwrap();
        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(obs.resource_up_to_date);
        assert_eq!(obs.connection_details[CONNECTION_ENDPOINT], "acme-logs");
        assert_eq!(obs.connection_details[CONNECTION_REGION], "us-east-1");
        assert_eq!(
            bucket.status.at_provider.arn.as_deref(),
            Some("arn:aws:s3:::acme-logs")
        );
        assert_eq!(
            get_condition(&bucket.status.conditions, ConditionType::Ready)
                .unwrap()
                .reason,
            ConditionReason::Available
        );

        let puts: Vec<_> = store
            .operations()
            .into_iter()
            .filter(|op| op.starts_with("Put"))
            .collect();
        assert_eq!(
            puts,
            vec![
                "PutBucketVersioning",
                "PutBucketLifecycleConfiguration",
                "PutBucketEncryption",
            ]
        );
    }

    #[tokio::test]
    async fn test_should_not_mutate_provider_once_ready() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = acme_logs();
        engine.create(&mut bucket).await.unwrap();
        engine.observe(&mut bucket).await.unwrap();
        engine.update(&bucket).await.unwrap();
        engine.observe(&mut bucket).await.unwrap();

        store.clear_calls();
        let before = bucket.spec.clone();
        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(obs.resource_up_to_date);
        assert!(!obs.resource_late_initialized);
        assert_eq!(bucket.spec, before);
        assert!(!store.operations().iter().any(|op| op.starts_with("Put")));
    }

    #[tokio::test]
    async fn test_should_late_init_provider_defaults_on_create() {
        let (_, engine) = engine(MemoryOptions::builder().default_encryption(true).build());
        let mut bucket = managed("acme-raw", BucketParameters::default());
        engine.create(&mut bucket).await.unwrap();

        let sse = bucket
            .spec
            .for_provider
            .server_side_encryption_configuration
            .as_ref()
            .unwrap();
        assert_eq!(
            sse.rules[0].apply_server_side_encryption_by_default.sse_algorithm,
            ServerSideEncryption::Aes256
        );
    }

    #[tokio::test]
    async fn test_should_treat_already_owned_as_created() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = acme_logs();
        engine.create(&mut bucket).await.unwrap();
        engine.create(&mut bucket).await.unwrap();
        assert_eq!(store.count("CreateBucket"), 2);
        assert_eq!(store.bucket_count(), 1);
    }

    #[tokio::test]
    async fn test_should_send_location_constraint_outside_us_east_1() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = managed(
            "acme-eu",
            BucketParameters {
                location_constraint: "eu-west-1".into(),
                ..BucketParameters::default()
            },
        );
        engine.create(&mut bucket).await.unwrap();
        assert_eq!(store.bucket_region("acme-eu").as_deref(), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn test_should_reject_invalid_bucket_name_before_create() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = managed("Acme_Logs", BucketParameters::default());
        let err = engine.create(&mut bucket).await.unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(store.count("CreateBucket"), 0);
    }

    #[tokio::test]
    async fn test_should_skip_acl_when_owner_enforced() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = managed(
            "acme-private",
            BucketParameters {
                acl: Some(BucketCannedAcl::PublicRead),
                object_ownership: Some(ObjectOwnership::BucketOwnerEnforced),
                ..BucketParameters::default()
            },
        );
        store
            .create_bucket(&CreateBucketInput {
                bucket: "acme-private".into(),
                ..CreateBucketInput::default()
            })
            .await
            .unwrap();

        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(obs.resource_up_to_date);
        assert_eq!(store.count("PutBucketOwnershipControls"), 1);
        assert_eq!(store.count("PutBucketAcl"), 0);
    }

    #[tokio::test]
    async fn test_should_apply_canned_acl_when_ready() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = managed(
            "acme-site",
            BucketParameters {
                acl: Some(BucketCannedAcl::PublicRead),
                ..BucketParameters::default()
            },
        );
        engine.create(&mut bucket).await.unwrap();
        engine.observe(&mut bucket).await.unwrap();
        assert_eq!(store.acl("acme-site"), Some(BucketCannedAcl::PublicRead));
    }

    #[tokio::test]
    async fn test_should_delete_and_ignore_missing_bucket() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = acme_logs();
        engine.create(&mut bucket).await.unwrap();

        engine.delete(&mut bucket).await.unwrap();
        assert!(!store.bucket_exists("acme-logs"));
        assert_eq!(
            get_condition(&bucket.status.conditions, ConditionType::Ready)
                .unwrap()
                .reason,
            ConditionReason::Deleting
        );
        engine.delete(&mut bucket).await.unwrap();
    }

    #[tokio::test]
    async fn test_should_drop_readiness_on_drift() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = acme_logs();
        engine.create(&mut bucket).await.unwrap();
        engine.observe(&mut bucket).await.unwrap();
        engine.update(&bucket).await.unwrap();
        engine.observe(&mut bucket).await.unwrap();

        store.delete_bucket_lifecycle("acme-logs").await.unwrap();
        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(!obs.resource_up_to_date);
        let ready = get_condition(&bucket.status.conditions, ConditionType::Ready).unwrap();
        assert_eq!(ready.reason, ConditionReason::Unavailable);
    }

    #[tokio::test]
    async fn test_should_only_head_bucket_while_deleting() {
        let (store, engine) = engine(MemoryOptions::default());
        let mut bucket = managed(
            "acme-site",
            BucketParameters {
                acl: Some(BucketCannedAcl::PublicRead),
                object_ownership: Some(ObjectOwnership::BucketOwnerPreferred),
                ..BucketParameters::default()
            },
        );
        engine.create(&mut bucket).await.unwrap();
        store.clear_calls();

        bucket.metadata.deletion_timestamp = Some(chrono::Utc::now());
        let obs = engine.observe(&mut bucket).await.unwrap();
        assert!(obs.resource_exists);
        assert_eq!(store.operations(), vec!["HeadBucket"]);
    }

    #[tokio::test]
    async fn test_should_surface_head_failures() {
        let (store, engine) = engine(MemoryOptions::default());
        store.fail_next(
            "HeadBucket",
            S3Error::new(S3ErrorCode::InternalError),
        );
        let err = engine.observe(&mut acme_logs()).await.unwrap_err();
        assert!(err.to_string().starts_with(ERR_HEAD));
    }
}
