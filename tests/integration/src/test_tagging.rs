//! Tags the provider attaches on its own.

#[cfg(test)]
mod tests {
    use rustack_provider_core::{ObjectMeta, ReconcileOutcome};
    use rustack_s3_model::types::{Tag, Tagging};
    use rustack_s3_model::{Bucket, BucketParameters};
    use rustack_s3_provider::MemoryOptions;
    use rustack_s3_provider::api::BucketApi;

    use crate::{BucketHarness, converge};

    fn harness() -> BucketHarness {
        BucketHarness::with_options(
            MemoryOptions::builder()
                .system_tags(vec![Tag::new("aws:created-by", "pipeline")])
                .build(),
        )
    }

    fn tagged(tags: Vec<Tag>) -> Bucket {
        Bucket::new(
            ObjectMeta::named("acme-tagged"),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                tagging: Some(Tagging { tag_set: tags }),
                ..BucketParameters::default()
            },
        )
    }

    #[tokio::test]
    async fn test_should_ignore_system_tags_once_converged() {
        let h = harness();
        let mut bucket = tagged(vec![Tag::new("user", "alice")]);

        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert_eq!(h.store.count("PutBucketTagging"), 1);

        let stored = h.store.get_bucket_tagging("acme-tagged").await.unwrap();
        assert!(stored.tag_set.contains(&Tag::new("aws:created-by", "pipeline")));
        assert!(stored.tag_set.contains(&Tag::new("user", "alice")));

        h.store.clear_calls();
        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Poll
        );
        assert_eq!(h.store.count("PutBucketTagging"), 0);
    }

    #[tokio::test]
    async fn test_should_not_see_drift_in_tag_order() {
        let h = harness();
        let mut bucket = tagged(vec![Tag::new("user", "alice"), Tag::new("team", "data")]);
        converge(&h.reconciler, &mut bucket).await;

        bucket
            .spec
            .for_provider
            .tagging
            .as_mut()
            .unwrap()
            .tag_set
            .reverse();
        h.store.clear_calls();

        assert_eq!(
            h.reconciler.reconcile(&mut bucket).await,
            ReconcileOutcome::Poll
        );
        assert_eq!(h.store.count("PutBucketTagging"), 0);
    }

    #[tokio::test]
    async fn test_should_drop_user_tags_and_keep_system_tags() {
        let h = harness();
        let mut bucket = tagged(vec![Tag::new("user", "alice")]);
        converge(&h.reconciler, &mut bucket).await;

        bucket.spec.for_provider.tagging = None;
        let outcomes = converge(&h.reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));

        let stored = h.store.get_bucket_tagging("acme-tagged").await.unwrap();
        assert_eq!(stored.tag_set, vec![Tag::new("aws:created-by", "pipeline")]);
    }
}
