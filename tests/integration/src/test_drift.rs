//! Out-of-band drift on a ready bucket.

#[cfg(test)]
mod tests {
    use rustack_provider_core::{ConditionReason, ConditionType, ObjectMeta, ReconcileOutcome};
    use rustack_s3_model::bucket::{
        ServerSideEncryptionByDefaultSpec, ServerSideEncryptionConfigurationSpec,
        ServerSideEncryptionRuleSpec,
    };
    use rustack_s3_model::types::{
        ServerSideEncryption, ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration,
        ServerSideEncryptionRule,
    };
    use rustack_s3_model::{Bucket, BucketParameters, S3Error, S3ErrorCode};
    use rustack_s3_provider::api::BucketApi;

    use crate::{BucketHarness, condition, converge};

    const KEY_A: &str = "arn:aws:kms:us-east-1:123456789012:key/key-a";
    const KEY_B: &str = "arn:aws:kms:us-east-1:123456789012:key/key-b";

    fn kms_bucket() -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-secure"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                server_side_encryption_configuration: Some(ServerSideEncryptionConfigurationSpec {
                    rules: vec![ServerSideEncryptionRuleSpec {
                        apply_server_side_encryption_by_default:
                            ServerSideEncryptionByDefaultSpec {
                                sse_algorithm: ServerSideEncryption::AwsKms,
                                kms_master_key_id: Some(KEY_A.into()),
                                kms_master_key_id_ref: None,
                                kms_master_key_id_selector: None,
                            },
                        bucket_key_enabled: Some(true),
                    }],
                }),
                ..BucketParameters::default()
            },
        )
    }

    fn mutations(ops: &[&'static str]) -> Vec<&'static str> {
        ops.iter()
            .copied()
            .filter(|op| !op.starts_with("Get") && !op.starts_with("Head"))
            .collect()
    }

    #[tokio::test]
    async fn test_should_repair_only_the_drifted_subresource() {
        let h = BucketHarness::new();
        let mut bucket = kms_bucket();
        converge(&h.reconciler, &mut bucket).await;

        h.store
            .put_bucket_encryption(
                "acme-secure",
                &ServerSideEncryptionConfiguration {
                    rules: vec![ServerSideEncryptionRule {
                        apply_server_side_encryption_by_default: Some(
                            ServerSideEncryptionByDefault {
                                sse_algorithm: ServerSideEncryption::AwsKms,
                                kms_master_key_id: Some(KEY_B.into()),
                            },
                        ),
                        bucket_key_enabled: Some(true),
                    }],
                },
            )
            .await
            .unwrap();
        h.store.clear_calls();

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Requeue
        );
        assert_eq!(mutations(&h.store.operations()), vec!["PutBucketEncryption"]);

        let restored = h.store.get_bucket_encryption("acme-secure").await.unwrap();
        let by_default = restored.rules[0]
            .apply_server_side_encryption_by_default
            .as_ref()
            .unwrap();
        assert_eq!(by_default.kms_master_key_id.as_deref(), Some(KEY_A));

        h.store.clear_calls();
        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Poll
        );
        assert!(mutations(&h.store.operations()).is_empty());
    }

    #[tokio::test]
    async fn test_should_drop_readiness_while_drifted() {
        let h = BucketHarness::new();
        let mut bucket = kms_bucket();
        converge(&h.reconciler, &mut bucket).await;
        assert_eq!(
            condition(&bucket.status.conditions, ConditionType::Ready).reason,
            ConditionReason::Available
        );

        h.store
            .delete_bucket_encryption("acme-secure")
            .await
            .unwrap();
        h.store.fail_next(
            "PutBucketEncryption",
            S3Error::new(S3ErrorCode::InternalError),
        );

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Requeue
        );
        assert_eq!(
            condition(&bucket.status.conditions, ConditionType::Ready).reason,
            ConditionReason::Unavailable
        );

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert_eq!(
            condition(&bucket.status.conditions, ConditionType::Ready).reason,
            ConditionReason::Available
        );
    }

    #[tokio::test]
    async fn test_should_recreate_bucket_deleted_out_of_band() {
        let h = BucketHarness::new();
        let mut bucket = kms_bucket();
        converge(&h.reconciler, &mut bucket).await;

        h.store.delete_bucket("acme-secure").await.unwrap();
        h.store.clear_calls();

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert_eq!(h.store.count("CreateBucket"), 1);
        assert!(h.store.bucket_exists("acme-secure"));
    }
}
