//! Table scenarios: the same engine pattern over DynamoDB.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rustack_dynamodb_model::types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ProvisionedThroughput,
        ScalarAttributeType, StreamSpecification, StreamViewType, TableStatus, Tag,
    };
    use rustack_dynamodb_model::{KIND_TABLE, Table, TableParameters};
    use rustack_dynamodb_provider::MemoryTableOptions;
    use rustack_provider_core::{
        ConditionReason, ConditionStatus, ConditionType, ObjectMeta, ReconcileOutcome,
    };

    use crate::{TableHarness, condition, converge};

    fn orders(params: TableParameters) -> Table {
        Table::new(
            ObjectMeta::named("orders"),
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
                ..params
            },
        )
    }

    fn on_demand() -> Table {
        orders(TableParameters {
            billing_mode: Some(BillingMode::PayPerRequest),
            tags: Some(vec![Tag::new("team", "payments")]),
            ..TableParameters::default()
        })
    }

    fn harness() -> TableHarness {
        TableHarness::with_options(MemoryTableOptions::default())
    }

    #[tokio::test]
    async fn test_should_create_table_without_follow_up_updates() {
        let h = harness();
        let mut table = on_demand();

        let outcomes = converge(&h.reconciler, &mut table).await;
        assert_eq!(
            outcomes,
            vec![ReconcileOutcome::Requeue, ReconcileOutcome::Poll]
        );
        assert_eq!(h.store.count("CreateTable"), 1);
        assert_eq!(h.store.count("UpdateTable"), 0);
        assert!(h.store.tags("orders").contains(&Tag::new("team", "payments")));

        let ready = condition(&table.status.conditions, ConditionType::Ready);
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(table.status.at_provider.table_status, Some(TableStatus::Active));

        let details = h.plane.connection_details(KIND_TABLE, "orders").unwrap();
        assert_eq!(details["tableName"], "orders");
        assert_eq!(details["region"], "us-east-1");
    }

    #[tokio::test]
    async fn test_should_wait_for_table_to_become_active() {
        let h = TableHarness::with_options(MemoryTableOptions::builder().settle_after(1).build());
        let mut table = on_demand();

        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Requeue
        );
        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Poll
        );
        let ready = condition(&table.status.conditions, ConditionType::Ready);
        assert_eq!(ready.status, ConditionStatus::False);
        assert_eq!(ready.reason, ConditionReason::Creating);

        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Poll
        );
        let ready = condition(&table.status.conditions, ConditionType::Ready);
        assert_eq!(ready.status, ConditionStatus::True);
    }

    #[tokio::test]
    async fn test_should_send_one_update_per_tick() {
        let h = harness();
        let mut table = on_demand();
        converge(&h.reconciler, &mut table).await;
        h.store.clear_calls();

        table.spec.for_provider.billing_mode = Some(BillingMode::Provisioned);
        table.spec.for_provider.provisioned_throughput = Some(ProvisionedThroughput {
            read_capacity_units: 5,
            write_capacity_units: 5,
        });
        table.spec.for_provider.stream_specification = Some(StreamSpecification {
            stream_enabled: true,
            stream_view_type: Some(StreamViewType::NewImage),
        });

        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Requeue
        );
        assert_eq!(h.store.count("UpdateTable"), 1);
        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Requeue
        );
        assert_eq!(h.store.count("UpdateTable"), 2);
        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Poll
        );
        assert_eq!(h.store.count("UpdateTable"), 2);

        let description = h.store.snapshot("orders").unwrap();
        assert_eq!(description.effective_billing_mode(), BillingMode::Provisioned);
        assert!(description.effective_stream().stream_enabled);
        let details = h.plane.connection_details(KIND_TABLE, "orders").unwrap();
        assert!(details.contains_key("streamArn"));
    }

    #[tokio::test]
    async fn test_should_repair_out_of_band_change() {
        let h = harness();
        let mut table = orders(TableParameters {
            billing_mode: Some(BillingMode::PayPerRequest),
            deletion_protection_enabled: Some(false),
            ..TableParameters::default()
        });
        converge(&h.reconciler, &mut table).await;

        h.store
            .modify("orders", |d| d.deletion_protection_enabled = true);
        h.store.clear_calls();

        let outcomes = converge(&h.reconciler, &mut table).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Poll));
        assert_eq!(h.store.count("UpdateTable"), 1);
        assert!(!h.store.snapshot("orders").unwrap().deletion_protection_enabled);
    }

    #[tokio::test]
    async fn test_should_block_delete_while_protected() {
        let h = harness();
        let mut table = orders(TableParameters {
            billing_mode: Some(BillingMode::PayPerRequest),
            deletion_protection_enabled: Some(true),
            ..TableParameters::default()
        });
        converge(&h.reconciler, &mut table).await;

        table.metadata.deletion_timestamp = Some(Utc::now());
        assert_eq!(
            h.reconciler.reconcile(&mut table).await,
            ReconcileOutcome::Requeue
        );
        assert!(h.store.table_exists("orders"));
        let synced = condition(&table.status.conditions, ConditionType::Synced);
        assert_eq!(synced.status, ConditionStatus::False);

        // Lifting protection first lets the delete through.
        table.metadata.deletion_timestamp = None;
        table.spec.for_provider.deletion_protection_enabled = Some(false);
        converge(&h.reconciler, &mut table).await;
        table.metadata.deletion_timestamp = Some(Utc::now());
        let outcomes = converge(&h.reconciler, &mut table).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Deleted));
        assert!(!h.store.table_exists("orders"));
    }

    #[tokio::test]
    async fn test_should_delete_table() {
        let h = TableHarness::with_options(MemoryTableOptions::builder().settle_after(1).build());
        let mut table = on_demand();
        converge(&h.reconciler, &mut table).await;
        converge(&h.reconciler, &mut table).await;

        table.metadata.deletion_timestamp = Some(Utc::now());
        let outcomes = converge(&h.reconciler, &mut table).await;
        assert_eq!(outcomes.last(), Some(&ReconcileOutcome::Deleted));
        assert_eq!(h.store.count("DeleteTable"), 1);
        assert!(!h.store.table_exists("orders"));
    }
}
