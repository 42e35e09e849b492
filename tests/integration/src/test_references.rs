//! Cross-resource references.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rustack_provider_core::{
        ConditionStatus, ConditionType, ObjectMeta, ReconcileOutcome, Reference, ReferencedObject,
        Selector,
    };
    use rustack_s3_model::bucket::{
        KIND_BUCKET, KIND_KEY, LoggingConfigurationSpec, ServerSideEncryptionByDefaultSpec,
        ServerSideEncryptionConfigurationSpec, ServerSideEncryptionRuleSpec,
    };
    use rustack_s3_model::types::{CreateBucketInput, ServerSideEncryption};
    use rustack_s3_model::{Bucket, BucketParameters};
    use rustack_s3_provider::api::BucketApi;

    use crate::{BucketHarness, condition, converge};

    const KEY_ARN: &str = "arn:aws:kms:us-east-1:123456789012:key/1234abcd";

    fn key_target() -> ReferencedObject {
        ReferencedObject {
            kind: KIND_KEY.into(),
            name: "bucket-key".into(),
            labels: BTreeMap::from([("tier".to_owned(), "prod".to_owned())]),
            external_name: Some("1234abcd".into()),
            arn: Some(KEY_ARN.into()),
        }
    }

    fn encrypted_with(key_ref: Option<Reference>, key_selector: Option<Selector>) -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-keyed"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                server_side_encryption_configuration: Some(ServerSideEncryptionConfigurationSpec {
                    rules: vec![ServerSideEncryptionRuleSpec {
                        apply_server_side_encryption_by_default:
                            ServerSideEncryptionByDefaultSpec {
                                sse_algorithm: ServerSideEncryption::AwsKms,
                                kms_master_key_id: None,
                                kms_master_key_id_ref: key_ref,
                                kms_master_key_id_selector: key_selector,
                            },
                        bucket_key_enabled: None,
                    }],
                }),
                ..BucketParameters::default()
            },
        )
    }

    async fn observed_key(h: &BucketHarness) -> Option<String> {
        let config = h.store.get_bucket_encryption("acme-keyed").await.unwrap();
        config.rules[0]
            .apply_server_side_encryption_by_default
            .as_ref()
            .and_then(|d| d.kms_master_key_id.clone())
    }

    #[tokio::test]
    async fn test_should_resolve_key_reference_before_calling_provider() {
        let h = BucketHarness::new();
        h.plane.register(key_target());
        let mut bucket = encrypted_with(Some(Reference::new("bucket-key")), None);

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert_eq!(observed_key(&h).await.as_deref(), Some(KEY_ARN));

        let by_default = &bucket
            .spec
            .for_provider
            .server_side_encryption_configuration
            .as_ref()
            .unwrap()
            .rules[0]
            .apply_server_side_encryption_by_default;
        assert_eq!(by_default.kms_master_key_id.as_deref(), Some(KEY_ARN));
    }

    #[tokio::test]
    async fn test_should_resolve_key_by_label_selector() {
        let h = BucketHarness::new();
        h.plane.register(key_target());
        let selector = Selector {
            match_labels: BTreeMap::from([("tier".to_owned(), "prod".to_owned())]),
        };
        let mut bucket = encrypted_with(None, Some(selector));

        converge(&h.reconciler, &mut bucket).await;
        assert_eq!(observed_key(&h).await.as_deref(), Some(KEY_ARN));
    }

    #[tokio::test]
    async fn test_should_report_unresolvable_reference_without_calls() {
        let h = BucketHarness::new();
        let mut bucket = encrypted_with(Some(Reference::new("missing-key")), None);

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Requeue
        );
        let synced = condition(&bucket.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::False);
        assert!(h.store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_should_resolve_logging_target_to_bucket_name() {
        let h = BucketHarness::new();
        h.store
            .create_bucket(&CreateBucketInput {
                bucket: "acme-audit".into(),
                ..CreateBucketInput::default()
            })
            .await
            .unwrap();
        h.plane.register(ReferencedObject {
            kind: KIND_BUCKET.into(),
            name: "audit".into(),
            labels: BTreeMap::new(),
            external_name: Some("acme-audit".into()),
            arn: Some("arn:aws:s3:::acme-audit".into()),
        });
        let mut bucket = Bucket::new(
            ObjectMeta::named("acme-keyed"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                logging_configuration: Some(LoggingConfigurationSpec {
                    target_bucket_ref: Some(Reference::new("audit")),
                    target_prefix: Some("logs/".into()),
                    ..LoggingConfigurationSpec::default()
                }),
                ..BucketParameters::default()
            },
        );

        converge(&h.reconciler, &mut bucket).await;
        let logging = h.store.get_bucket_logging("acme-keyed").await.unwrap();
        assert_eq!(
            logging.logging_enabled.map(|l| l.target_bucket).as_deref(),
            Some("acme-audit")
        );
    }
}
