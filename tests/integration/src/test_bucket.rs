//! Bucket lifecycle scenarios.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rustack_provider_core::{
        ConditionReason, ConditionStatus, ConditionType, DeletionPolicy, ObjectMeta,
        ReconcileOutcome,
    };
    use rustack_s3_model::bucket::{
        ServerSideEncryptionByDefaultSpec, ServerSideEncryptionConfigurationSpec,
        ServerSideEncryptionRuleSpec,
    };
    use rustack_s3_model::types::{
        BucketVersioningStatus, CreateBucketInput, LifecycleConfiguration, LifecycleExpiration,
        LifecycleRule, LifecycleRuleFilter, RuleStatus, ServerSideEncryption,
        VersioningConfiguration,
    };
    use rustack_s3_model::{Bucket, BucketParameters};
    use rustack_s3_provider::api::BucketApi;

    use crate::{BucketHarness, condition, converge};

    fn acme_logs() -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-logs"),
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

    fn position(operations: &[&str], operation: &str) -> usize {
        operations
            .iter()
            .position(|op| *op == operation)
            .unwrap_or_else(|| panic!("{operation} was never called"))
    }

    #[tokio::test]
    async fn test_should_create_green_field_bucket_and_become_ready() {
        let h = BucketHarness::new();
        let mut bucket = acme_logs();

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert!(h.store.bucket_exists("acme-logs"));
        assert_eq!(bucket.metadata.external_name(), "acme-logs");

        let ops = h.store.operations();
        assert_eq!(position(&ops, "HeadBucket"), 0);
        assert!(position(&ops, "CreateBucket") < position(&ops, "PutBucketVersioning"));
        assert!(position(&ops, "PutBucketVersioning") < position(&ops, "PutBucketEncryption"));
        assert_eq!(h.store.count("PutBucketLifecycleConfiguration"), 1);

        let ready = condition(&bucket.status.conditions, ConditionType::Ready);
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(ready.reason, ConditionReason::Available);
        let synced = condition(&bucket.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::True);

        let details = h.plane.connection_details("Bucket", "acme-logs").unwrap();
        assert_eq!(details["endpoint"], "acme-logs");
        assert_eq!(details["region"], "us-east-1");
        let stored: Bucket = h.plane.get_resource("Bucket", "acme-logs").unwrap();
        assert_eq!(stored, bucket);
    }

    #[tokio::test]
    async fn test_should_not_touch_provider_once_ready() {
        let h = BucketHarness::new();
        let mut bucket = acme_logs();
        converge(&h.reconciler, &mut bucket).await;
        h.store.clear_calls();

        for _ in 0..3 {
            assert_eq!(
                h.reconciler.reconcile(&mut bucket).await,
                ReconcileOutcome::Poll
            );
        }
        assert!(
            h.store
                .operations()
                .iter()
                .all(|op| op.starts_with("Get") || op.starts_with("Head")),
            "unexpected mutation: {:?}",
            h.store.operations()
        );
    }

    #[tokio::test]
    async fn test_should_delete_bucket_when_requested() {
        let h = BucketHarness::new();
        let mut bucket = acme_logs();
        converge(&h.reconciler, &mut bucket).await;

        bucket.metadata.deletion_timestamp = Some(Utc::now());
        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Deleted));
        assert!(!h.store.bucket_exists("acme-logs"));
        assert_eq!(h.store.count("DeleteBucket"), 1);
    }

    #[tokio::test]
    async fn test_should_orphan_bucket_without_calling_provider() {
        let h = BucketHarness::new();
        let mut bucket = acme_logs().with_deletion_policy(DeletionPolicy::Orphan);
        converge(&h.reconciler, &mut bucket).await;
        h.store.clear_calls();

        bucket.metadata.deletion_timestamp = Some(Utc::now());
        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Deleted
        );
        assert!(h.store.bucket_exists("acme-logs"));
        assert!(h.store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_should_park_invalid_bucket_name_without_calls() {
        let h = BucketHarness::new();
        let mut bucket = Bucket::new(
            ObjectMeta::named("Not_A_Bucket"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                ..BucketParameters::default()
            },
        );

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Poll
        );
        let synced = condition(&bucket.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::False);
        assert_eq!(synced.reason, ConditionReason::ReconcileError);
        assert_eq!(h.store.count("CreateBucket"), 0);
    }

    #[tokio::test]
    async fn test_should_adopt_existing_bucket_by_external_name() {
        let h = BucketHarness::new();
        h.store
            .create_bucket(&CreateBucketInput {
                bucket: "legacy-assets".into(),
                ..CreateBucketInput::default()
            })
            .await
            .unwrap();
        h.store.clear_calls();

        let mut bucket = acme_logs();
        bucket.metadata.set_external_name("legacy-assets");
        converge(&h.reconciler, &mut bucket).await;

        assert_eq!(h.store.count("CreateBucket"), 0);
        assert!(!h.store.bucket_exists("acme-logs"));
        let versioning = h.store.get_bucket_versioning("legacy-assets").await.unwrap();
        assert_eq!(versioning.status, Some(BucketVersioningStatus::Enabled));
    }
}
