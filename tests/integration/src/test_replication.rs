//! Replication needs versioning first.

#[cfg(test)]
mod tests {
    use rustack_provider_core::{
        ConditionStatus, ConditionType, ObjectMeta, ReconcileOutcome, Reference, ReferencedObject,
    };
    use rustack_s3_model::bucket::{
        DestinationSpec, KIND_ROLE, ReplicationConfigurationSpec, ReplicationRuleSpec,
    };
    use rustack_s3_model::types::{BucketVersioningStatus, RuleStatus, VersioningConfiguration};
    use rustack_s3_model::{Bucket, BucketParameters};
    use rustack_s3_provider::api::BucketApi;

    use crate::{BucketHarness, condition, converge};

    const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/replicator";

    fn replicated(versioning: Option<BucketVersioningStatus>) -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-primary"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                versioning_configuration: versioning.map(|status| VersioningConfiguration {
                    status: Some(status),
                    mfa_delete: None,
                }),
                replication_configuration: Some(ReplicationConfigurationSpec {
                    role_ref: Some(Reference::new("replicator")),
                    rules: vec![ReplicationRuleSpec {
                        id: Some("to-dr".into()),
                        priority: None,
                        status: RuleStatus::Enabled,
                        filter: None,
                        destination: DestinationSpec {
                            bucket: Some("arn:aws:s3:::acme-dr".into()),
                            ..DestinationSpec::default()
                        },
                        delete_marker_replication: None,
                        source_selection_criteria: None,
                        existing_object_replication: None,
                    }],
                    ..ReplicationConfigurationSpec::default()
                }),
                ..BucketParameters::default()
            },
        )
    }

    fn harness() -> BucketHarness {
        let h = BucketHarness::new();
        h.plane.register(ReferencedObject {
            kind: KIND_ROLE.into(),
            name: "replicator".into(),
            labels: Default::default(),
            external_name: Some("replicator".into()),
            arn: Some(ROLE_ARN.into()),
        });
        h
    }

    #[tokio::test]
    async fn test_should_enable_versioning_before_replication() {
        let h = harness();
        let mut bucket = replicated(Some(BucketVersioningStatus::Enabled));

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));

        let ops = h.store.operations();
        let versioning = ops.iter().position(|op| *op == "PutBucketVersioning").unwrap();
        let replication = ops.iter().position(|op| *op == "PutBucketReplication").unwrap();
        assert!(versioning < replication);

        let stored = h.store.get_bucket_replication("acme-primary").await.unwrap();
        assert_eq!(stored.role, ROLE_ARN);
        assert_eq!(stored.rules.len(), 1);
    }

    #[tokio::test]
    async fn test_should_surface_replication_rejection_without_versioning() {
        let h = harness();
        let mut bucket = replicated(None);

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert!(outcomes.iter().all(|o| *o == ReconcileOutcome::Requeue));

        let synced = condition(&bucket.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::False);
        assert!(
            synced
                .message
                .as_deref()
                .unwrap_or_default()
                .contains("cannot put replication configuration"),
            "unexpected message: {:?}",
            synced.message
        );
        assert!(h.store.get_bucket_replication("acme-primary").await.is_err());
    }
}
