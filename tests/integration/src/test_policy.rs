//! Bucket policy removal rules.

#[cfg(test)]
mod tests {
    use rustack_provider_core::{ObjectMeta, ReconcileOutcome};
    use rustack_s3_model::bucket::{PolicyDeletionPolicy, PolicyUpdatePolicy};
    use rustack_s3_model::policy::{
        BucketPolicyBody, BucketPolicyStatement, BucketPrincipal, PolicyEffect,
    };
    use rustack_s3_model::{Bucket, BucketParameters};
    use rustack_s3_provider::api::BucketApi;

    use crate::{BucketHarness, converge};

    fn public_read() -> BucketPolicyBody {
        BucketPolicyBody {
            version: Some("2012-10-17".into()),
            statements: vec![BucketPolicyStatement {
                sid: Some("PublicRead".into()),
                effect: PolicyEffect::Allow,
                principal: Some(BucketPrincipal {
                    all_principals: Some(true),
                    ..BucketPrincipal::default()
                }),
                action: vec!["s3:GetObject".into()],
                resource: vec!["arn:aws:s3:::acme-site/*".into()],
                ..BucketPolicyStatement::default()
            }],
            ..BucketPolicyBody::default()
        }
    }

    fn site(deletion_policy: PolicyDeletionPolicy) -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-site"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                policy: Some(public_read()),
                policy_update_policy: Some(PolicyUpdatePolicy { deletion_policy }),
                ..BucketParameters::default()
            },
        )
    }

    async fn unset_policy(h: &BucketHarness, bucket: &mut Bucket) -> Vec<ReconcileOutcome> {
        converge(&h.reconciler, bucket).await;
        assert!(h.store.get_bucket_policy("acme-site").await.is_ok());
        bucket.spec.for_provider.policy = None;
        h.store.clear_calls();
        converge(&h.reconciler, bucket).await
    }

    #[tokio::test]
    async fn test_should_keep_policy_when_unset_by_default() {
        let h = BucketHarness::new();
        let mut bucket = site(PolicyDeletionPolicy::Never);

        let outcomes = unset_policy(&h, &mut bucket).await;
        assert_eq!(outcomes, vec![ReconcileOutcome::Poll]);
        assert_eq!(h.store.count("DeleteBucketPolicy"), 0);
        assert!(h.store.get_bucket_policy("acme-site").await.is_ok());
    }

    #[tokio::test]
    async fn test_should_remove_policy_when_unset_with_if_null() {
        let h = BucketHarness::new();
        let mut bucket = site(PolicyDeletionPolicy::IfNull);

        let outcomes = unset_policy(&h, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert_eq!(h.store.count("DeleteBucketPolicy"), 1);
        assert!(h.store.get_bucket_policy("acme-site").await.is_err());
    }

    #[tokio::test]
    async fn test_should_not_rewrite_reformatted_policy() {
        let h = BucketHarness::new();
        let mut bucket = site(PolicyDeletionPolicy::Never);
        converge(&h.reconciler, &mut bucket).await;

        h.store
            .put_bucket_policy(
                "acme-site",
                r#"{"Statement":{"Resource":"arn:aws:s3:::acme-site/*","Action":"s3:GetObject",
                "Principal":"*","Effect":"Allow","Sid":"PublicRead"},"Version":"2012-10-17"}"#,
            )
            .await
            .unwrap();
        h.store.clear_calls();

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Poll
        );
        assert_eq!(h.store.count("PutBucketPolicy"), 0);
    }
}
