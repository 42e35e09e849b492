//! Live round trips against `AWS_ENDPOINT_URL`.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rustack_dynamodb_model::types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
    };
    use rustack_dynamodb_model::{Table, TableParameters};
    use rustack_provider_core::{ConditionStatus, ConditionType, ObjectMeta, ReconcileOutcome};
    use rustack_s3_model::types::{BucketVersioningStatus, VersioningConfiguration};
    use rustack_s3_model::{Bucket, BucketParameters};

    use crate::{condition, converge, live_bucket_reconciler, live_table_reconciler, unique_name};

    #[tokio::test]
    #[ignore = "requires a running S3 endpoint"]
    async fn test_should_create_and_delete_live_bucket() {
        let (_plane, reconciler) = live_bucket_reconciler();
        let mut bucket = Bucket::new(
            ObjectMeta::named(unique_name("bucket")),
            BucketParameters {
                location_constraint: "us-east-1".into(),
                versioning_configuration: Some(VersioningConfiguration {
                    status: Some(BucketVersioningStatus::Enabled),
                    mfa_delete: None,
                }),
                ..BucketParameters::default()
            },
        );

        let outcomes = converge(&reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        let ready = condition(&bucket.status.conditions, ConditionType::Ready);
        assert_eq!(ready.status, ConditionStatus::True);

        bucket.metadata.deletion_timestamp = Some(Utc::now());
        let outcomes = converge(&reconciler, &mut bucket).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Deleted));
    }

    #[tokio::test]
    #[ignore = "requires a running DynamoDB endpoint"]
    async fn test_should_create_and_delete_live_table() {
        let (_plane, reconciler) = live_table_reconciler();
        let mut table = Table::new(
            ObjectMeta::named(unique_name("table")),
            TableParameters {
                region: "us-east-1".into(),
                attribute_definitions: vec![AttributeDefinition {
                    attribute_name: "pk".into(),
                    attribute_type: ScalarAttributeType::S,
                }],
                key_schema: vec![KeySchemaElement {
                    attribute_name: "pk".into(),
                    key_type: KeyType::Hash,
                }],
                billing_mode: Some(BillingMode::PayPerRequest),
                ..TableParameters::default()
            },
        );

        // Tables may report CREATING for a while; keep ticking until ready.
        for _ in 0..30 {
            reconciler.reconcile(&mut table).await;
            let ready = condition(&table.status.conditions, ConditionType::Ready);
            if ready.status == ConditionStatus::True {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
        let ready = condition(&table.status.conditions, ConditionType::Ready);
        assert_eq!(ready.status, ConditionStatus::True);

        table.metadata.deletion_timestamp = Some(Utc::now());
        let mut deleted = false;
        for _ in 0..30 {
            if reconciler.reconcile(&mut table).await == ReconcileOutcome::Deleted {
                deleted = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
        assert!(deleted);
    }
}
