//! Object lock is one-way.

#[cfg(test)]
mod tests {
    use rustack_provider_core::{
        ConditionReason, ConditionStatus, ConditionType, ObjectMeta, ReconcileOutcome,
    };
    use rustack_s3_model::bucket::{ObjectLockConfigurationSpec, ObjectLockState};
    use rustack_s3_model::types::{Tag, Tagging};
    use rustack_s3_model::{Bucket, BucketParameters};

    use crate::{BucketHarness, condition, converge};

    fn vault(state: ObjectLockState) -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-vault"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                object_lock_enabled_for_bucket: Some(true),
                tagging: Some(Tagging {
                    tag_set: vec![Tag::new("team", "records")],
                }),
                object_lock_configuration: Some(ObjectLockConfigurationSpec {
                    object_lock_enabled: Some(state),
                    rule: None,
                }),
                ..BucketParameters::default()
            },
        )
    }

    #[tokio::test]
    async fn test_should_refuse_to_disable_object_lock() {
        let h = BucketHarness::new();
        let mut bucket = vault(ObjectLockState::Disabled);

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));

        let synced = condition(&bucket.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::False);
        assert_eq!(synced.reason, ConditionReason::ReconcileError);
        assert!(
            synced
                .message
                .as_deref()
                .unwrap_or_default()
                .contains("object lock cannot be disabled once enabled"),
            "unexpected message: {:?}",
            synced.message
        );
        assert_eq!(h.store.count("PutObjectLockConfiguration"), 0);
        assert_eq!(h.store.count("PutBucketTagging"), 1);
    }

    #[tokio::test]
    async fn test_should_keep_refusing_on_later_ticks() {
        let h = BucketHarness::new();
        let mut bucket = vault(ObjectLockState::Disabled);
        converge(&h.reconciler, &mut bucket).await;
        h.store.clear_calls();

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Poll
        );
        assert_eq!(h.store.count("PutObjectLockConfiguration"), 0);
    }

    #[tokio::test]
    async fn test_should_settle_when_lock_stays_enabled() {
        let h = BucketHarness::new();
        let mut bucket = vault(ObjectLockState::Enabled);

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        let synced = condition(&bucket.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::True);
    }
}
